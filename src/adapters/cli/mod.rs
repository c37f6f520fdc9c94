//! CLI Adapter

mod commands;

pub use commands::{CliApp, Command, RefreshCmd, ResolveCmd, ShowCmd};
