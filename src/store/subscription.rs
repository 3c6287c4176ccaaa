//! Scoped subscription handle.

use super::Collection;
use tokio::task::JoinHandle;
use tracing::debug;

/// A live subscription to one collection.
///
/// Closing or dropping the handle stops the listener, so a screen that owns its
/// subscriptions releases them when it is torn down.
#[derive(Debug)]
pub struct Subscription {
    collection: Collection,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(super) const fn new(collection: Collection, handle: JoinHandle<()>) -> Self {
        Self {
            collection,
            handle: Some(handle),
        }
    }

    /// Collection this subscription listens to.
    #[must_use]
    pub const fn collection(&self) -> Collection {
        self.collection
    }

    /// Whether the listener is still running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Stops the listener.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("Closed subscription to {}", self.collection);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.shutdown();
    }
}
