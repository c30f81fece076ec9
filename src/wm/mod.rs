mod ipc;
mod link;
mod nag;

pub use ipc::{I3Ipc, IpcError};
pub use link::WmLink;
pub use nag::{NagBar, NagBarError};
