//! Notification sink for one CLI invocation.
//!
//! Logs every event through `TracingSink` and remembers which
//! collections failed to synchronize so the command can fail loudly
//! instead of printing an empty list.

use std::collections::HashMap;
use std::sync::Mutex;

use hrsync_core::{
    EntityKind, NotificationEvent, NotificationHandle, NotificationSink, TracingSink,
};

#[derive(Debug, Default)]
pub struct CliSink {
    log: TracingSink,
    sync_failures: Mutex<HashMap<EntityKind, String>>,
}

impl CliSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reason of the last failed load of `kind`, if any.
    pub fn sync_failure(&self, kind: EntityKind) -> Option<String> {
        self.sync_failures
            .lock()
            .ok()
            .and_then(|failures| failures.get(&kind).cloned())
    }
}

impl NotificationSink for CliSink {
    fn handle(&self, event: NotificationEvent) -> NotificationHandle {
        if let NotificationEvent::SyncFailed { kind, reason } = &event {
            if let Ok(mut failures) = self.sync_failures.lock() {
                failures.insert(*kind, reason.clone());
            }
        }
        self.log.handle(event)
    }

    fn dismiss(&self, handle: NotificationHandle) {
        self.log.dismiss(handle);
    }
}
