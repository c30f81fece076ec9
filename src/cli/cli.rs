use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Save and restore i3 workspace layouts")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Capture the current layout tree and persist it
    Save,
    /// Replay the persisted layout tree
    Restore {
        /// Restrict the replay to a single workspace number
        workspace: Option<String>,
    },
}
