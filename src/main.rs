use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use nacosctl::client::ConfigClient;
use nacosctl::commands::{self, Scope};
use nacosctl::config::{CliArgs, Command, Config};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let args = CliArgs::parse();
    if let Command::Completion { shell } = &args.command {
        return commands::write_completion(*shell, &mut std::io::stdout());
    }

    let config = Config::from_args(&args)?;
    init_logging(&config.log_level);
    config.validate()?;

    let scope = Scope {
        namespace: args.scope_namespace()?.to_string(),
        group: args.group.clone(),
    };

    tracing::debug!(
        addr = %config.addr,
        api_version = %config.api_version,
        authenticated = config.has_credentials(),
        cache_dir = %config.cache_dir.display(),
        "Configuration loaded"
    );

    let client = ConfigClient::new(Arc::new(config))?;
    commands::execute(&client, &scope, &args.command).await
}

/// Logs go to stderr so command output can be redirected
fn init_logging(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();
}
