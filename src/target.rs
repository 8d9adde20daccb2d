// Deployment targets - fixed attribute sets per environment
//
// Adding an environment is a table change, not a code change.

use clap::ValueEnum;

/// Application name, the prefix of every stack name.
pub const APPLICATION_NAME: &str = "Web-Dashboard";

/// Named deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Staging,
    Production,
}

impl Environment {
    /// Fixed attribute set for this environment.
    pub fn target(self) -> &'static DeployTarget {
        // TARGETS is ordered by discriminant
        &TARGETS[self as usize]
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Staging => write!(f, "staging"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Everything environment-specific a deployment needs, immutable after
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployTarget {
    pub hosted_zone: &'static str,
    pub subdomain: &'static str,
    pub region: &'static str,
    pub index_document: &'static str,
    pub error_document: &'static str,
    stack_suffix: &'static str,
}

impl DeployTarget {
    /// Stack name, `<ApplicationName>-<CapitalizedEnvironment>`.
    pub fn stack_name(&self) -> String {
        format!("{}-{}", APPLICATION_NAME, self.stack_suffix)
    }

    /// Wildcard domain pattern the TLS certificate must carry.
    pub fn certificate_pattern(&self) -> String {
        format!("*.{}", self.hosted_zone)
    }
}

const TARGETS: [DeployTarget; 2] = [
    DeployTarget {
        hosted_zone: "density.rodeo",
        subdomain: "dashboard.density.rodeo",
        region: "us-east-1",
        index_document: "index.html",
        error_document: "404.html",
        stack_suffix: "Staging",
    },
    DeployTarget {
        hosted_zone: "density.io",
        subdomain: "dashboard.density.io",
        region: "us-east-1",
        index_document: "index.html",
        error_document: "404.html",
        stack_suffix: "Production",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_target() {
        let target = Environment::Staging.target();
        assert_eq!(target.hosted_zone, "density.rodeo");
        assert_eq!(target.subdomain, "dashboard.density.rodeo");
        assert_eq!(target.region, "us-east-1");
        assert_eq!(target.stack_name(), "Web-Dashboard-Staging");
    }

    #[test]
    fn test_production_target() {
        let target = Environment::Production.target();
        assert_eq!(target.hosted_zone, "density.io");
        assert_eq!(target.subdomain, "dashboard.density.io");
        assert_eq!(target.region, "us-east-1");
        assert_eq!(target.stack_name(), "Web-Dashboard-Production");
    }

    #[test]
    fn test_certificate_pattern() {
        assert_eq!(
            Environment::Production.target().certificate_pattern(),
            "*.density.io"
        );
    }

    #[test]
    fn test_documents() {
        for env in [Environment::Staging, Environment::Production] {
            let target = env.target();
            assert_eq!(target.index_document, "index.html");
            assert_eq!(target.error_document, "404.html");
        }
    }
}
