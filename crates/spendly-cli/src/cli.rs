//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Spendly - Track expenses, investments, and budgets
#[derive(Parser)]
#[command(name = "spendly")]
#[command(about = "Self-hosted personal finance tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "spendly.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set SPENDLY_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an identity header or API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show one month at a glance (summary, budgets)
    Dashboard {
        /// Username to show (records are scoped per user)
        #[arg(short, long, default_value = "local-dev")]
        user: String,

        /// Month to show, "YYYY-MM" (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Generate a monthly report artifact
    Report {
        /// Username to report on
        #[arg(short, long, default_value = "local-dev")]
        user: String,

        /// Month to snapshot, "YYYY-MM" (defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Output directory for the report artifact
        /// (defaults to the platform data directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Seed the database with demo data
    Seed {
        /// Username to seed records for
        #[arg(short, long, default_value = "local-dev")]
        user: String,
    },

    /// Show database status (encryption, size, etc.)
    Status,
}
