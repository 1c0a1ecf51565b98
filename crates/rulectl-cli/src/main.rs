//! rulectl CLI
//!
//! Manage an organization's security rules as local files: edit, plan,
//! push, refresh.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use colored::Colorize;

use rulectl_core::config;
use rulectl_core::remote::shutdown_channel;

use cli::Cli;
use context::Context;
use error::{CliError, Result};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let action = cli
        .action()
        .ok_or_else(|| CliError::user("no action given; see --help"))?;

    let config_path = config::config_path(cli.config.as_deref())?;
    let settings = config::load(&config_path)?;

    if let Err(e) = logging::init(&settings.log_level, cli.verbose) {
        eprintln!("{}: logging disabled: {}", "warning".yellow().bold(), e);
    }
    tracing::debug!(config = %config_path.display(), ?action, "Starting");

    let (trigger, shutdown) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received; stopping after the change in flight");
            trigger.trigger();
        }
    });

    let ctx = Context::new(settings, shutdown)?;
    commands::execute(&ctx, action).await
}
