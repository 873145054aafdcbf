use std::fmt;
use std::sync::Arc;

use storage::repository::{KeyValueStore, StorageError};

/// The single slot a quiz service writes its document to.
///
/// Store failures are logged and swallowed so the quiz keeps working in
/// memory. The first failure marks the slot degraded; later successful writes
/// clear the flag again.
pub(crate) struct DocumentSlot {
    store: Arc<dyn KeyValueStore>,
    key: String,
    degraded: bool,
}

impl DocumentSlot {
    pub(crate) fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            degraded: false,
        }
    }

    pub(crate) fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub(crate) async fn read(&mut self) -> Option<String> {
        match self.store.get(&self.key).await {
            Ok(raw) => {
                self.degraded = false;
                raw
            }
            Err(error) => {
                self.record_failure("read", &error);
                None
            }
        }
    }

    pub(crate) async fn write(&mut self, raw: &str) {
        match self.store.set(&self.key, raw).await {
            Ok(()) => self.record_success(),
            Err(error) => self.record_failure("write", &error),
        }
    }

    pub(crate) async fn clear(&mut self) {
        match self.store.remove(&self.key).await {
            Ok(()) => self.record_success(),
            Err(error) => self.record_failure("clear", &error),
        }
    }

    fn record_success(&mut self) {
        if self.degraded {
            tracing::info!(key = %self.key, "storage recovered");
        }
        self.degraded = false;
    }

    fn record_failure(&mut self, op: &'static str, error: &StorageError) {
        if self.degraded {
            tracing::debug!(key = %self.key, op, %error, "storage still unavailable");
        } else {
            tracing::warn!(key = %self.key, op, %error, "storage unavailable; continuing in memory");
        }
        self.degraded = true;
    }
}

impl fmt::Debug for DocumentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSlot")
            .field("key", &self.key)
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}
