//! Error taxonomy for a deployment run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can end a deployment run
#[derive(Debug, Error)]
pub enum DeployError {
    /// Certificate lookup matched zero or several entries. Exactly one
    /// wildcard certificate must exist for the hosted zone; picking an
    /// arbitrary match risks deploying with the wrong certificate.
    #[error("expected exactly one certificate matching '{pattern}', found {count}")]
    CertificateMatch { pattern: String, count: usize },

    /// Update requested but the stack already matches the template and
    /// parameters. The converger reclassifies this as a successful no-op;
    /// it never reaches the caller.
    #[error("no updates are to be performed")]
    NoUpdates,

    /// Local template file could not be read.
    #[error("failed to read template {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Any other provider failure, surfaced with the provider's original
    /// error chain intact so operators can diagnose against provider logs.
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Result type alias for deployment operations
pub type Result<T> = std::result::Result<T, DeployError>;
