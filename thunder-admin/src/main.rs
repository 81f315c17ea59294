//! Thunder Admin - operator console for the recharge backend

mod cli;
mod commands;
mod console;
mod logger;
mod prompt;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (.env is optional)
    dotenv::dotenv().ok();

    // 2. Arguments and logging
    let cli = Cli::parse();
    logger::init_logger(&cli.log_level, cli.log_json, cli.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Thunder admin starting");

    // 3. Run the command
    if let Err(e) = commands::run(cli).await {
        tracing::error!(error = ?e, "Command failed");
        return Err(e);
    }

    Ok(())
}
