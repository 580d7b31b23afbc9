use anyhow::Context;
use clap::Parser;
use tracing::error;

use smart_panel_media_lib::bootstrap::tracing::init_tracing_subscriber;
use smart_panel_media_lib::bootstrap::{default_config_path, load_config, wire_dependencies};
use smart_panel_media_lib::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_config(config_path)?;

    let log_dir = (!config.log_directory.as_os_str().is_empty()).then_some(config.log_directory.as_path());
    init_tracing_subscriber(log_dir).context("Failed to initialize tracing")?;

    let runtime = wire_dependencies(&config).await?;

    match execute(cli.command, &runtime).await {
        Ok(documents) => {
            for document in documents {
                println!("{}", serde_json::to_string_pretty(&document)?);
            }
            Ok(())
        }
        Err(err) => {
            error!(error = %format!("{:#}", err), "Command failed");
            Err(err)
        }
    }
}
