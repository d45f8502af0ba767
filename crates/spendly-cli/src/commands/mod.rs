//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Core commands (init) and shared utilities (open_db, parse_month_arg)
//! - `reports` - Report generation command
//! - `seed` - Demo data seeding
//! - `serve` - Web server command
//! - `status` - Status and dashboard commands

pub mod core;
pub mod reports;
pub mod seed;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use core::*;
pub use reports::*;
pub use seed::*;
pub use serve::*;
pub use status::*;
