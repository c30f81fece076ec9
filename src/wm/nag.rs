use compio::process::{Child, Command};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

const NAG_MESSAGE: &str = "Currently restoring session. Don't change workspace focus!";

/// Advisory `i3-nagbar` shown while a restore runs. The bar asks the
/// user to keep their hands off the focus; it carries no state of its
/// own and must come down on every restore exit path.
pub struct NagBar {
    child: Child,
}

impl NagBar {
    pub fn show() -> Result<Self, NagBarError> {
        debug!("Showing the restore advisory nag bar");
        let mut cmd = Command::new("i3-nagbar");
        cmd.arg("-m").arg(NAG_MESSAGE);
        let child = cmd.spawn().context(SpawnSnafu)?;
        Ok(Self { child })
    }

    /// Dismisses the bar. A failure here only costs the user a manual
    /// click on the bar's close button, so it is logged and swallowed.
    pub async fn dismiss(mut self) {
        debug!("Dismissing the restore advisory nag bar");
        if let Err(e) = self.child.kill() {
            warn!("Failed to dismiss the nag bar: {e}");
        }
    }
}

#[derive(Debug, Snafu)]
pub enum NagBarError {
    #[snafu(display("Failed to spawn i3-nagbar"))]
    SpawnError { source: std::io::Error },
}
