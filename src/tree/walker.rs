use std::future::Future;
use std::pin::Pin;

use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::tree::node::{Node, ReplayError, Variant};
use crate::tree::record::SnapshotRecord;
use crate::tree::wait::BoundedWait;
use crate::wm::WmLink;
use crate::x11::WindowClassResolver;

/// Capture-side walk: returns an annotated copy of `records` with every
/// window-bearing leaf's owning-process class attached.
///
/// Depth-first; a record with a non-empty child list is treated as a
/// structural level and only its descendants are inspected, so leaves
/// are annotated at any depth. Sibling order is preserved, keeping
/// snapshots reproducible. Records that already carry a process tag are
/// left untouched, so re-annotating a tree never re-queries.
///
/// A failed lookup is non-fatal: the leaf stays untagged (and replays
/// nothing later), a warning is logged, and the walk continues.
pub fn annotate<'r, R: WindowClassResolver>(
    resolver: &'r R,
    records: Vec<SnapshotRecord>,
) -> Pin<Box<dyn Future<Output = Vec<SnapshotRecord>> + 'r>> {
    Box::pin(async move {
        let mut annotated = Vec::with_capacity(records.len());

        for mut record in records {
            match record.nodes.take() {
                Some(children) if !children.is_empty() => {
                    record.nodes = Some(annotate(resolver, children).await);
                }
                leaf_nodes => {
                    record.nodes = leaf_nodes;
                    if record.process.is_none() {
                        if let Some(window) = record.window {
                            match resolver.resolve(window).await {
                                Ok(process) => record.process = Some(process),
                                Err(e) => {
                                    warn!("Leaving window {window} untagged: {e}");
                                }
                            }
                        }
                    }
                }
            }
            annotated.push(record);
        }

        annotated
    })
}

/// Restore-side walk: replays a captured record sequence against the
/// live window manager in document order, optionally restricted to one
/// workspace.
pub struct RestoreWalk<'w, W: WmLink> {
    wm: &'w mut W,
    wait: BoundedWait,
    workspace_filter: Option<String>,
}

impl<'w, W: WmLink> RestoreWalk<'w, W> {
    pub fn new(wm: &'w mut W, wait: BoundedWait, workspace_filter: Option<String>) -> Self {
        Self {
            wm,
            wait,
            workspace_filter,
        }
    }

    /// Replays the whole sequence. The first replay error aborts the
    /// walk; whatever was already replayed stays in place.
    pub async fn run(&mut self, records: &[SnapshotRecord]) -> Result<(), RestoreError> {
        self.walk(records, None).await
    }

    fn walk<'a>(
        &'a mut self,
        records: &'a [SnapshotRecord],
        parent: Option<&'a SnapshotRecord>,
    ) -> Pin<Box<dyn Future<Output = Result<(), RestoreError>> + 'a>> {
        Box::pin(async move {
            for record in records {
                let node = Node::new(record, parent);
                node.replay(self.wm, &self.wait)
                    .await
                    .context(ReplaySnafu { id: record.id })?;

                // `nodes: Some([])` still counts as having children; the
                // walk into an empty list is simply a no-op.
                if let Some(children) = &record.nodes {
                    if self.filtered_out(&node) {
                        debug!(
                            "Workspace {:?} outside the filter, skipping its subtree",
                            record.num
                        );
                        continue;
                    }
                    self.walk(children, Some(record)).await?;
                }
            }
            Ok(())
        })
    }

    /// Whether the workspace filter excludes this node's subtree. Only
    /// workspaces are ever filtered; the filtered-out workspace's own
    /// switch command has already been replayed at this point, and its
    /// siblings keep going.
    fn filtered_out(&self, node: &Node<'_>) -> bool {
        match (&self.workspace_filter, node.variant, node.record.num) {
            (Some(filter), Variant::Workspace, Some(num)) => num.to_string() != *filter,
            _ => false,
        }
    }
}

#[derive(Debug, Snafu)]
pub enum RestoreError {
    #[snafu(display("Failed to replay record {id}"))]
    ReplayError { id: u64, source: ReplayError },
}
