use crate::tree::SnapshotRecord;
use crate::wm::IpcError;

/// Seam between the tree walkers and the live window manager. The real
/// implementation is [`crate::wm::I3Ipc`]; tests script their own.
pub trait WmLink {
    /// Queries the full current layout tree.
    async fn get_tree(&mut self) -> Result<SnapshotRecord, IpcError>;

    /// Dispatches one directive, e.g. `("workspace", "2")`. i3 does
    /// acknowledge commands, but this link treats them as
    /// fire-and-forget: the reply payload is not surfaced, and layout
    /// drift from a rejected command shows up visually rather than as
    /// an error.
    async fn command(&mut self, verb: &str, arg: &str) -> Result<(), IpcError>;
}
