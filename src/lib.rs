// stack-deploy - converge the dashboard static-site stack for one environment
//
// One invocation performs, strictly in sequence:
// 1. Resolve the environment to its fixed deployment target
// 2. Read the stack template from a local file
// 3. Look up the wildcard TLS certificate for the target's hosted zone
// 4. Probe the stack by name, then create or update it
//
// Remote concurrency control is the provider's job; this tool assumes
// at-most-one concurrent deployer per stack name.

use std::path::Path;

use anyhow::Result;
use aws_config::{BehaviorVersion, Region};
use tracing::info;

pub mod aws;
pub mod certificate;
pub mod error;
pub mod stack;
pub mod target;

use aws::{AcmCertificates, CloudFormationStacks};
use certificate::resolve_wildcard;
use stack::{converge, Convergence, StackSpec};
use target::Environment;

/// Run one deployment for `environment`, reading the stack template from
/// `template_path`. Callable without process-level side effects.
pub async fn run(environment: Environment, template_path: &Path) -> Result<Convergence> {
    let target = environment.target();
    let stack_name = target.stack_name();

    info!(
        environment = %environment,
        stack = %stack_name,
        region = target.region,
        "Starting deployment"
    );

    let template_body =
        std::fs::read_to_string(template_path).map_err(|source| error::DeployError::Template {
            path: template_path.to_path_buf(),
            source,
        })?;

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(target.region))
        .load()
        .await;

    let certificates = AcmCertificates::new(&config);
    let certificate_arn = resolve_wildcard(&certificates, target.hosted_zone).await?;
    info!(certificate = %certificate_arn, "Resolved wildcard certificate");

    let spec = StackSpec {
        name: stack_name,
        template_body,
        parameters: vec![
            (stack::PARAM_HOSTED_ZONE_NAME, target.hosted_zone.to_string()),
            (stack::PARAM_AWS_REGION, target.region.to_string()),
            (stack::PARAM_SSL_CERTIFICATE_ARN, certificate_arn),
            (stack::PARAM_SUBDOMAIN_NAME, target.subdomain.to_string()),
            (stack::PARAM_INDEX_DOCUMENT, target.index_document.to_string()),
            (stack::PARAM_ERROR_DOCUMENT, target.error_document.to_string()),
        ],
    };

    let stacks = CloudFormationStacks::new(&config);
    let outcome = converge(&stacks, &spec).await?;

    info!(stack = %spec.name, outcome = %outcome, "Deployment finished");

    Ok(outcome)
}
