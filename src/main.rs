use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use stack_deploy::target::Environment;

/// Deploy the dashboard static-site CloudFormation stack
#[derive(Parser)]
#[command(name = "stack-deploy")]
#[command(version)]
#[command(about = "Deploy the dashboard static-site CloudFormation stack", long_about = None)]
struct Cli {
    /// Deployment environment
    #[arg(value_enum)]
    environment: Environment,

    /// Path to the CloudFormation template
    #[arg(long, value_name = "FILE", default_value = "stack.template")]
    template: PathBuf,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level);

    // Build tokio runtime and run the deployment
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async { stack_deploy::run(cli.environment, &cli.template).await })?;

    Ok(())
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();
}
