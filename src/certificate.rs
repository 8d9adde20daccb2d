// Certificate resolution - find the one wildcard certificate for a hosted zone

use async_trait::async_trait;

use crate::error::{DeployError, Result};

/// One entry from the provider's certificate listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateEntry {
    pub domain: String,
    pub arn: String,
}

/// Source of certificate summaries (ACM in production, fakes in tests)
#[async_trait]
pub trait CertificateSource {
    async fn list(&self) -> Result<Vec<CertificateEntry>>;
}

/// Resolve the ARN of the wildcard certificate covering `hosted_zone`.
///
/// Exactly one listed certificate may carry the domain `*.<hosted_zone>`.
/// Zero or several matches is a hard error naming the pattern and the match
/// count; silently taking an arbitrary match could deploy the wrong
/// certificate.
pub async fn resolve_wildcard(
    source: &dyn CertificateSource,
    hosted_zone: &str,
) -> Result<String> {
    let pattern = format!("*.{}", hosted_zone);
    let mut matches: Vec<CertificateEntry> = source
        .list()
        .await?
        .into_iter()
        .filter(|cert| cert.domain == pattern)
        .collect();

    match matches.len() {
        1 => Ok(matches.remove(0).arn),
        count => Err(DeployError::CertificateMatch { pattern, count }),
    }
}
