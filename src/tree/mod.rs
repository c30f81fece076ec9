mod node;
mod record;
mod wait;
mod walker;

pub use node::{Node, ReplayError, Variant};
pub use record::{Orientation, SnapshotRecord};
pub use wait::BoundedWait;
pub use walker::{RestoreError, RestoreWalk, annotate};
