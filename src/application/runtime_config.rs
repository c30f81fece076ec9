use crate::cli::{Cli, Command};

/// What this invocation should do, derived from the CLI surface.
#[derive(Debug, Clone)]
pub enum Action {
    Save,
    Restore { workspace: Option<String> },
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub action: Action,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        let action = match cli.command {
            Command::Save => Action::Save,
            Command::Restore { workspace } => Action::Restore { workspace },
        };
        Self { action }
    }
}
