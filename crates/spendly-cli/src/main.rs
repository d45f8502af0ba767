//! Spendly CLI - Personal finance tracker
//!
//! Usage:
//!   spendly init                 Initialize database
//!   spendly seed                 Load demo data
//!   spendly dashboard            Show the current month at a glance
//!   spendly report --month 2024-03   Generate a monthly report
//!   spendly serve --port 3000    Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Dashboard { user, month } => {
            commands::cmd_dashboard(&cli.db, &user, month.as_deref(), cli.no_encrypt)
        }
        Commands::Report {
            user,
            month,
            out_dir,
        } => commands::cmd_report(
            &cli.db,
            &user,
            month.as_deref(),
            out_dir.as_deref(),
            cli.no_encrypt,
        ),
        Commands::Seed { user } => commands::cmd_seed(&cli.db, &user, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
