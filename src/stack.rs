// Stack convergence - probe for existence, then create or update
//
// Per invocation: START -> PROBING -> {CREATING | UPDATING} ->
// {CONVERGED | NO_OP | FAILED}. No retries, no partial-failure recovery.

use async_trait::async_trait;
use tracing::info;

use crate::error::{DeployError, Result};

/// Parameter keys the stack template accepts, in the order they are sent.
pub const PARAM_HOSTED_ZONE_NAME: &str = "HostedZoneName";
pub const PARAM_AWS_REGION: &str = "AWSRegion";
pub const PARAM_SSL_CERTIFICATE_ARN: &str = "SSLCertificateARN";
pub const PARAM_SUBDOMAIN_NAME: &str = "SubdomainName";
pub const PARAM_INDEX_DOCUMENT: &str = "IndexDocument";
pub const PARAM_ERROR_DOCUMENT: &str = "ErrorDocument";

/// Everything one create or update call needs, built fresh per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSpec {
    pub name: String,
    pub template_body: String,
    /// Key/value pairs, each sent with "use previous value" disabled.
    pub parameters: Vec<(&'static str, String)>,
}

/// Stack-management provider (CloudFormation in production, fakes in tests)
#[async_trait]
pub trait StackProvider {
    /// Probe the stack by name. `Ok(false)` only for the provider's specific
    /// "stack does not exist" classification; permission and transient
    /// failures propagate as errors.
    async fn stack_exists(&self, name: &str) -> Result<bool>;

    async fn create_stack(&self, spec: &StackSpec) -> Result<()>;

    /// May fail with [`DeployError::NoUpdates`] when the stack already
    /// matches; the converger reclassifies that as success.
    async fn update_stack(&self, spec: &StackSpec) -> Result<()>;
}

/// Which mutating call the probe selected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeAction {
    Create,
    Update,
}

/// How the invocation converged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Created,
    Updated,
    /// Update was a no-op: the stack already matched the template and
    /// parameters. Success, reported informationally.
    Unchanged,
}

impl std::fmt::Display for Convergence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Convergence::Created => write!(f, "created"),
            Convergence::Updated => write!(f, "updated"),
            Convergence::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Converge the named stack to the spec: create it if absent, update it if
/// present. Exactly one mutating call is issued per invocation.
pub async fn converge(provider: &dyn StackProvider, spec: &StackSpec) -> Result<Convergence> {
    let action = if provider.stack_exists(&spec.name).await? {
        ConvergeAction::Update
    } else {
        ConvergeAction::Create
    };

    match action {
        ConvergeAction::Create => {
            info!(stack = %spec.name, "Stack not found, creating");
            provider.create_stack(spec).await?;
            Ok(Convergence::Created)
        }
        ConvergeAction::Update => {
            info!(stack = %spec.name, "Stack exists, updating");
            match provider.update_stack(spec).await {
                Ok(()) => Ok(Convergence::Updated),
                Err(DeployError::NoUpdates) => {
                    info!(stack = %spec.name, "No updates are to be performed");
                    Ok(Convergence::Unchanged)
                }
                Err(err) => Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fake provider recording which calls were made
    struct FakeStacks {
        exists: Result<bool>,
        update: Result<()>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl FakeStacks {
        fn new(exists: Result<bool>) -> Self {
            Self {
                exists,
                update: Ok(()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_update(mut self, update: Result<()>) -> Self {
            self.update = update;
            self
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }
    }

    // Result<T, DeployError> is not Clone; re-stage stored outcomes by hand.
    fn restage<T: Copy>(outcome: &Result<T>) -> Result<T> {
        match outcome {
            Ok(v) => Ok(*v),
            Err(DeployError::NoUpdates) => Err(DeployError::NoUpdates),
            Err(other) => Err(DeployError::Provider(anyhow::anyhow!("{other}"))),
        }
    }

    #[async_trait]
    impl StackProvider for FakeStacks {
        async fn stack_exists(&self, _name: &str) -> Result<bool> {
            self.record("describe");
            restage(&self.exists)
        }

        async fn create_stack(&self, _spec: &StackSpec) -> Result<()> {
            self.record("create");
            Ok(())
        }

        async fn update_stack(&self, _spec: &StackSpec) -> Result<()> {
            self.record("update");
            restage(&self.update)
        }
    }

    fn spec() -> StackSpec {
        StackSpec {
            name: "Web-Dashboard-Staging".to_string(),
            template_body: "{}".to_string(),
            parameters: vec![(PARAM_HOSTED_ZONE_NAME, "density.rodeo".to_string())],
        }
    }

    #[tokio::test]
    async fn test_missing_stack_takes_create_path() {
        let provider = FakeStacks::new(Ok(false));

        let outcome = converge(&provider, &spec()).await.unwrap();
        assert_eq!(outcome, Convergence::Created);
        assert_eq!(provider.calls(), vec!["describe", "create"]);
    }

    #[tokio::test]
    async fn test_existing_stack_takes_update_path() {
        let provider = FakeStacks::new(Ok(true));

        let outcome = converge(&provider, &spec()).await.unwrap();
        assert_eq!(outcome, Convergence::Updated);
        assert_eq!(provider.calls(), vec!["describe", "update"]);
    }

    #[tokio::test]
    async fn test_probe_error_propagates_without_mutation() {
        let provider = FakeStacks::new(Err(DeployError::Provider(anyhow::anyhow!(
            "User is not authorized to perform cloudformation:DescribeStacks"
        ))));

        let err = converge(&provider, &spec()).await.unwrap_err();
        assert!(matches!(err, DeployError::Provider(_)));
        // No create or update attempted after a failed probe
        assert_eq!(provider.calls(), vec!["describe"]);
    }

    #[tokio::test]
    async fn test_no_op_update_is_success() {
        let provider = FakeStacks::new(Ok(true)).with_update(Err(DeployError::NoUpdates));

        let outcome = converge(&provider, &spec()).await.unwrap();
        assert_eq!(outcome, Convergence::Unchanged);
    }

    #[tokio::test]
    async fn test_other_update_error_propagates() {
        let provider = FakeStacks::new(Ok(true)).with_update(Err(DeployError::Provider(
            anyhow::anyhow!("Stack is in UPDATE_IN_PROGRESS state and can not be updated"),
        )));

        let err = converge(&provider, &spec()).await.unwrap_err();
        assert!(matches!(err, DeployError::Provider(_)));
    }
}
