// ── Notifications ──
//
// Every user-visible message the core produces is a `NotificationEvent`
// handed to a single `NotificationSink`. Sinks hand back an opaque
// handle so transient "in progress" messages can be dismissed once the
// outcome is known.

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::model::{Capability, Describe, EntityKind, EntityRecord, MutationKind};

const BROADCAST_CHANNEL_SIZE: usize = 64;

/// Opaque identifier of a shown notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationHandle(u64);

/// Direction of a bulk file transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferDirection {
    Import,
    Export,
}

/// Everything the core ever tells the user.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    SyncFailed {
        kind: EntityKind,
        reason: String,
    },
    MutationStarted {
        kind: EntityKind,
        operation: MutationKind,
    },
    MutationSucceeded {
        operation: MutationKind,
        record: EntityRecord,
    },
    MutationFailed {
        kind: EntityKind,
        operation: MutationKind,
        reason: String,
    },
    CapabilityUnavailable {
        capability: Capability,
    },
    CapabilityRestored {
        capability: Capability,
    },
    TransferStarted {
        kind: EntityKind,
        direction: TransferDirection,
    },
    TransferSucceeded {
        kind: EntityKind,
        direction: TransferDirection,
        /// Written file, for exports.
        path: Option<PathBuf>,
    },
    TransferFailed {
        kind: EntityKind,
        direction: TransferDirection,
        reason: String,
    },
    ReconnectStarted,
    ReconnectSucceeded,
    ReconnectFailed,
    BaseUrlTesting {
        url: String,
    },
    BaseUrlSaved {
        url: String,
    },
    BaseUrlFailed {
        url: String,
        reason: String,
    },
}

impl NotificationEvent {
    /// Whether this reports a failure or degraded state.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::SyncFailed { .. }
                | Self::MutationFailed { .. }
                | Self::CapabilityUnavailable { .. }
                | Self::TransferFailed { .. }
                | Self::ReconnectFailed
                | Self::BaseUrlFailed { .. }
        )
    }

    /// Whether this is a transient progress message.
    pub fn is_progress(&self) -> bool {
        matches!(
            self,
            Self::MutationStarted { .. }
                | Self::TransferStarted { .. }
                | Self::ReconnectStarted
                | Self::BaseUrlTesting { .. }
        )
    }
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyncFailed { kind, reason } => {
                write!(f, "Could not synchronize {}: {reason}", kind.plural())
            }
            Self::MutationStarted { kind, operation } => {
                write!(f, "{} {}...", operation.progressive(), kind.noun())
            }
            Self::MutationSucceeded { operation, record } => write!(
                f,
                "{} \"{}\" {}",
                capitalize(record.kind().noun()),
                record.describe(),
                operation.past_tense()
            ),
            Self::MutationFailed {
                kind,
                operation,
                reason,
            } => write!(f, "Failed to {operation} {}: {reason}", kind.noun()),
            Self::CapabilityUnavailable { capability } => write!(
                f,
                "{} are unavailable. Displayed data has been cleared.",
                capability.label()
            ),
            Self::CapabilityRestored { capability } => {
                write!(f, "{} are available again", capability.label())
            }
            Self::TransferStarted { kind, direction } => match direction {
                TransferDirection::Import => write!(f, "Importing {}...", kind.plural()),
                TransferDirection::Export => write!(f, "Exporting {}...", kind.plural()),
            },
            Self::TransferSucceeded {
                kind,
                direction,
                path,
            } => match (direction, path) {
                (TransferDirection::Export, Some(path)) => write!(
                    f,
                    "{} exported to {}",
                    capitalize(kind.plural()),
                    path.display()
                ),
                (TransferDirection::Export, None) => {
                    write!(f, "{} exported", capitalize(kind.plural()))
                }
                (TransferDirection::Import, _) => {
                    write!(f, "{} imported", capitalize(kind.plural()))
                }
            },
            Self::TransferFailed {
                kind,
                direction,
                reason,
            } => {
                let verb = match direction {
                    TransferDirection::Import => "import",
                    TransferDirection::Export => "export",
                };
                write!(f, "Failed to {verb} {}: {reason}", kind.plural())
            }
            Self::ReconnectStarted => f.write_str("Reconnecting to the HR service..."),
            Self::ReconnectSucceeded => f.write_str("Reconnected: every service is available"),
            Self::ReconnectFailed => f.write_str("Some services are still unavailable"),
            Self::BaseUrlTesting { url } => write!(f, "Testing connection to {url}..."),
            Self::BaseUrlSaved { url } => write!(f, "API address set to {url}"),
            Self::BaseUrlFailed { url, reason } => {
                write!(f, "Could not reach {url}: {reason}")
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

// ── Sink ─────────────────────────────────────────────────────────────

/// Where notifications go.
pub trait NotificationSink: Send + Sync {
    fn handle(&self, event: NotificationEvent) -> NotificationHandle;
    fn dismiss(&self, handle: NotificationHandle);
}

#[derive(Debug, Default)]
struct HandleSeq(AtomicU64);

impl HandleSeq {
    fn next(&self) -> NotificationHandle {
        NotificationHandle(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// A notification as observed by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Shown {
        handle: NotificationHandle,
        event: NotificationEvent,
    },
    Dismissed(NotificationHandle),
}

/// Fans notifications out over a `broadcast` channel for UIs.
#[derive(Debug)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
    seq: HandleSeq,
}

impl BroadcastSink {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CHANNEL_SIZE);
        Self {
            tx,
            seq: HandleSeq::default(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastSink {
    fn handle(&self, event: NotificationEvent) -> NotificationHandle {
        let handle = self.seq.next();
        // No subscribers is fine.
        let _ = self.tx.send(Notification::Shown { handle, event });
        handle
    }

    fn dismiss(&self, handle: NotificationHandle) {
        let _ = self.tx.send(Notification::Dismissed(handle));
    }
}

/// Renders notifications as log lines.
#[derive(Debug, Default)]
pub struct TracingSink {
    seq: HandleSeq,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for TracingSink {
    fn handle(&self, event: NotificationEvent) -> NotificationHandle {
        let handle = self.seq.next();
        if event.is_error() {
            warn!(handle = handle.0, "{event}");
        } else {
            info!(handle = handle.0, "{event}");
        }
        handle
    }

    fn dismiss(&self, _handle: NotificationHandle) {}
}

/// Records every notification in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    seq: HandleSeq,
    log: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Shown events only, in order.
    pub fn events(&self) -> Vec<NotificationEvent> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Shown { event, .. } => Some(event),
                Notification::Dismissed(_) => None,
            })
            .collect()
    }

    /// Number of shown events matching `pred`.
    pub fn count(&self, pred: impl Fn(&NotificationEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&self) {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl NotificationSink for MemorySink {
    fn handle(&self, event: NotificationEvent) -> NotificationHandle {
        let handle = self.seq.next();
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification::Shown { handle, event });
        handle
    }

    fn dismiss(&self, handle: NotificationHandle) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification::Dismissed(handle));
    }
}
