// AWS-backed providers: ACM certificate listing, CloudFormation stacks
//
// Error classification happens here, against the provider's structured
// error code and message. Only the specific "stack does not exist" and
// "no updates" responses get special handling; everything else keeps its
// original detail and propagates.

use async_trait::async_trait;
use aws_sdk_acm::Client as AcmClient;
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::{Capability, Parameter};
use aws_sdk_cloudformation::Client as CfnClient;

use crate::certificate::{CertificateEntry, CertificateSource};
use crate::error::{DeployError, Result};
use crate::stack::{StackProvider, StackSpec};

/// Exact message CloudFormation returns for a no-op update.
const NO_UPDATES_MESSAGE: &str = "No updates are to be performed.";

/// Certificate source backed by AWS Certificate Manager
pub struct AcmCertificates {
    client: AcmClient,
}

impl AcmCertificates {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: AcmClient::new(config),
        }
    }
}

#[async_trait]
impl CertificateSource for AcmCertificates {
    async fn list(&self) -> Result<Vec<CertificateEntry>> {
        let mut entries = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_certificates()
                .set_next_token(next_token)
                .send()
                .await
                .map_err(|err| {
                    DeployError::Provider(
                        anyhow::Error::new(err).context("Failed to list ACM certificates"),
                    )
                })?;

            for summary in resp.certificate_summary_list() {
                if let (Some(domain), Some(arn)) =
                    (summary.domain_name(), summary.certificate_arn())
                {
                    entries.push(CertificateEntry {
                        domain: domain.to_string(),
                        arn: arn.to_string(),
                    });
                }
            }

            next_token = resp.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(entries)
    }
}

/// Stack provider backed by AWS CloudFormation
pub struct CloudFormationStacks {
    client: CfnClient,
}

impl CloudFormationStacks {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: CfnClient::new(config),
        }
    }

    fn build_parameters(spec: &StackSpec) -> Vec<Parameter> {
        spec.parameters
            .iter()
            .map(|(key, value)| {
                Parameter::builder()
                    .parameter_key(*key)
                    .parameter_value(value)
                    .use_previous_value(false)
                    .build()
            })
            .collect()
    }
}

#[async_trait]
impl StackProvider for CloudFormationStacks {
    async fn stack_exists(&self, name: &str) -> Result<bool> {
        match self.client.describe_stacks().stack_name(name).send().await {
            Ok(_) => Ok(true),
            Err(err) if stack_is_missing(err.code(), err.message()) => Ok(false),
            Err(err) => Err(DeployError::Provider(
                anyhow::Error::new(err).context(format!("Failed to describe stack {name}")),
            )),
        }
    }

    async fn create_stack(&self, spec: &StackSpec) -> Result<()> {
        self.client
            .create_stack()
            .stack_name(&spec.name)
            .template_body(&spec.template_body)
            .set_parameters(Some(Self::build_parameters(spec)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
            .map_err(|err| {
                DeployError::Provider(
                    anyhow::Error::new(err)
                        .context(format!("Failed to create stack {}", spec.name)),
                )
            })?;

        Ok(())
    }

    async fn update_stack(&self, spec: &StackSpec) -> Result<()> {
        match self
            .client
            .update_stack()
            .stack_name(&spec.name)
            .template_body(&spec.template_body)
            .set_parameters(Some(Self::build_parameters(spec)))
            .capabilities(Capability::CapabilityIam)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(err) if update_is_no_op(err.message()) => Err(DeployError::NoUpdates),
            Err(err) => Err(DeployError::Provider(
                anyhow::Error::new(err).context(format!("Failed to update stack {}", spec.name)),
            )),
        }
    }
}

/// DescribeStacks signals a missing stack as a ValidationError whose message
/// reads "Stack with id <name> does not exist". Only that shape maps to
/// "not found"; permission and transient errors keep their classification.
fn stack_is_missing(code: Option<&str>, message: Option<&str>) -> bool {
    code == Some("ValidationError")
        && message.is_some_and(|m| m.contains("does not exist"))
}

/// UpdateStack refuses an update that would change nothing with a fixed
/// message; that response is a successful no-op, not a failure.
fn update_is_no_op(message: Option<&str>) -> bool {
    message == Some(NO_UPDATES_MESSAGE)
}
