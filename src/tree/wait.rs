use std::time::Duration;

use tracing::trace;

/// How long to sleep between polls of the live tree.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(200);
/// How many polls to attempt before giving up on seeing a change.
const DEFAULT_MAX_POLLS: u32 = 5;

/// Bounded polling loop that waits for the window manager's state to
/// visibly change after a command, as a proxy for a real completion
/// signal. i3 applies commands asynchronously, so callers poll a
/// "has the state changed" predicate instead of assuming the command
/// landed.
///
/// Exhausting the poll budget is a soft timeout, not an error: the
/// change may simply be invisible in the tree, and restore proceeds
/// optimistically either way.
//TODO - replace the polling with an i3 event subscription once the IPC
// client speaks SUBSCRIBE
#[derive(Debug, Clone, Copy)]
pub struct BoundedWait {
    pub poll_interval: Duration,
    pub max_polls: u32,
}

impl Default for BoundedWait {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

impl BoundedWait {
    /// Polls `changed` up to `max_polls` times, sleeping `poll_interval`
    /// before each attempt. Returns `Ok(true)` as soon as the predicate
    /// reports a change and `Ok(false)` once the budget is exhausted.
    /// Predicate errors propagate immediately.
    pub async fn until<E, F>(&self, mut changed: F) -> Result<bool, E>
    where
        F: AsyncFnMut() -> Result<bool, E>,
    {
        for poll in 1..=self.max_polls {
            compio::time::sleep(self.poll_interval).await;
            if changed().await? {
                trace!("Change observed on poll {poll}/{}", self.max_polls);
                return Ok(true);
            }
        }
        trace!("No change observed after {} polls", self.max_polls);
        Ok(false)
    }
}
