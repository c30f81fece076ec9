use colored::Colorize;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::application::{Action, RuntimeConfig};
use crate::store::{SessionStore, SessionStoreError};
use crate::tree::{BoundedWait, RestoreError, RestoreWalk, SnapshotRecord, annotate};
use crate::wm::{I3Ipc, IpcError, NagBar, WmLink};
use crate::x11::XpropResolver;

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let store = SessionStore::at_default_location().context(SessionStoreFailureSnafu)?;
        let mut wm = I3Ipc::connect().await.context(WmUnavailableSnafu)?;

        match app_config.action {
            Action::Save => Self::save(&mut wm, &store).await,
            Action::Restore { workspace } => Self::restore(&mut wm, &store, workspace).await,
        }
    }

    /// Captures the live tree, annotates its window leaves with their
    /// owning processes, and persists the result.
    async fn save(wm: &mut impl WmLink, store: &SessionStore) -> Result<(), ApplicationError> {
        println!("{}", "Saving session...".bold());

        let mut session = wm.get_tree().await.context(WmUnavailableSnafu)?;
        if let Some(records) = session.nodes.take() {
            session.nodes = Some(annotate(&XpropResolver, records).await);
        }
        store.write(&session).await.context(SessionStoreFailureSnafu)?;

        println!(
            "Session saved to {}",
            store.path().display().to_string().green()
        );
        Ok(())
    }

    /// Loads the persisted tree and replays it, keeping the advisory
    /// nag bar up for exactly as long as the replay runs.
    async fn restore(
        wm: &mut impl WmLink,
        store: &SessionStore,
        workspace: Option<String>,
    ) -> Result<(), ApplicationError> {
        // Load before showing the bar; a missing session file should
        // not flash it.
        let session = store.read().await.context(SessionStoreFailureSnafu)?;

        let nag_bar = match NagBar::show() {
            Ok(bar) => Some(bar),
            Err(e) => {
                warn!("Restoring without the advisory nag bar: {e}");
                None
            }
        };

        println!("{}", "Restoring session...".bold());
        let result = Self::replay(wm, &session, workspace).await;

        // The bar comes down on every exit path, replay errors included.
        if let Some(bar) = nag_bar {
            bar.dismiss().await;
        }
        result?;

        println!(
            "Session restored from {}",
            store.path().display().to_string().green()
        );
        Ok(())
    }

    async fn replay(
        wm: &mut impl WmLink,
        session: &SnapshotRecord,
        workspace: Option<String>,
    ) -> Result<(), ApplicationError> {
        let Some(records) = &session.nodes else {
            debug!("The captured session has no content to replay");
            return Ok(());
        };

        RestoreWalk::new(wm, BoundedWait::default(), workspace)
            .run(records)
            .await
            .context(ReplayAbortedSnafu)
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Could not reach i3"))]
    WmUnavailable { source: IpcError },
    #[snafu(display("Can't use the saved session"))]
    SessionStoreFailure { source: SessionStoreError },
    #[snafu(display("Session replay aborted"))]
    ReplayAborted { source: RestoreError },
}
