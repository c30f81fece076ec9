use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::tree::record::{Orientation, SnapshotRecord};
use crate::tree::wait::BoundedWait;
use crate::wm::{IpcError, WmLink};

/// What a record is, decided once per traversal step from its shape and
/// never re-inspected afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Workspace,
    Client,
    Container,
}

impl Variant {
    /// Pure function of record shape: a workspace number wins, then an
    /// annotated process, everything else is structural.
    pub fn classify(record: &SnapshotRecord) -> Self {
        if record.num.is_some() {
            Variant::Workspace
        } else if record.process.is_some() {
            Variant::Client
        } else {
            Variant::Container
        }
    }
}

/// One position in the tree during a restore walk. Both references are
/// non-owning; the parent link exists only for the split-orientation
/// lookup, and nodes never outlive a single traversal.
pub struct Node<'t> {
    pub record: &'t SnapshotRecord,
    pub parent: Option<&'t SnapshotRecord>,
    pub variant: Variant,
}

impl<'t> Node<'t> {
    pub fn new(record: &'t SnapshotRecord, parent: Option<&'t SnapshotRecord>) -> Self {
        Self {
            variant: Variant::classify(record),
            record,
            parent,
        }
    }

    /// Re-creates this node against the live window manager.
    ///
    /// Splits act on the currently focused container, so the parent's
    /// split direction must be dispatched before the command that
    /// creates this node — for every child, not just the first.
    pub async fn replay<W: WmLink>(
        &self,
        wm: &mut W,
        wait: &BoundedWait,
    ) -> Result<(), ReplayError> {
        if let Some(parent) = self.parent {
            if parent.orientation != Orientation::None {
                debug!("Setting split orientation to {}", parent.orientation);
                wm.command("split", &parent.orientation.to_string())
                    .await
                    .context(DispatchSnafu { verb: "split" })?;
            }
        }

        match self.variant {
            Variant::Workspace => {
                if let Some(num) = self.record.num {
                    debug!("Switching to workspace {num}");
                    dispatch_and_settle(wm, wait, "workspace", &num.to_string()).await?;
                }
            }
            Variant::Client => {
                if let Some(process) = &self.record.process {
                    debug!("Launching '{process}'");
                    dispatch_and_settle(wm, wait, "exec", process).await?;
                    // Refocus the enclosing container so the next
                    // sibling splits relative to it rather than the
                    // just-launched window.
                    dispatch_and_settle(wm, wait, "focus", "parent").await?;
                }
            }
            // Structure is implied by the preceding split and the
            // children that follow.
            Variant::Container => {}
        }

        Ok(())
    }
}

/// Issues one command and polls until the live tree differs from the
/// snapshot taken immediately before dispatch. A poll budget exhausted
/// without a visible change is tolerated: the restore proceeds
/// optimistically.
async fn dispatch_and_settle<W: WmLink>(
    wm: &mut W,
    wait: &BoundedWait,
    verb: &str,
    arg: &str,
) -> Result<(), ReplayError> {
    let baseline = wm.get_tree().await.context(SettleSnafu)?;
    wm.command(verb, arg).await.context(DispatchSnafu { verb })?;

    let settled = wait
        .until(async || {
            let tree = wm.get_tree().await?;
            Ok::<_, IpcError>(tree != baseline)
        })
        .await
        .context(SettleSnafu)?;
    if !settled {
        debug!("Tree did not visibly change after '{verb} {arg}', proceeding anyway");
    }

    Ok(())
}

#[derive(Debug, Snafu)]
pub enum ReplayError {
    #[snafu(display("Failed to dispatch '{verb}' to the window manager"))]
    DispatchError { verb: String, source: IpcError },
    #[snafu(display("Failed to re-query the layout tree while settling"))]
    SettleError { source: IpcError },
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn record(num: Option<i32>, process: Option<&str>) -> SnapshotRecord {
        SnapshotRecord {
            id: 1,
            name: None,
            orientation: Orientation::None,
            num,
            window: None,
            nodes: None,
            process: process.map(str::to_string),
        }
    }

    #[rstest]
    #[case(record(Some(3), None), Variant::Workspace)]
    #[case(record(None, Some("urxvt")), Variant::Client)]
    #[case(record(None, None), Variant::Container)]
    // A workspace number wins even over a (nonsensical) process tag.
    #[case(record(Some(1), Some("urxvt")), Variant::Workspace)]
    fn classifies_by_record_shape(
        #[case] record: SnapshotRecord,
        #[case] expected: Variant,
    ) {
        assert_eq!(Variant::classify(&record), expected);
    }

    #[test]
    fn classification_happens_once_at_construction() {
        let rec = record(None, Some("gvim"));
        let node = Node::new(&rec, None);
        assert_eq!(node.variant, Variant::Client);
        assert!(node.parent.is_none());
    }
}
