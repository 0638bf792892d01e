// ── Availability tracking ──
//
// One tracker per capability group. The state is a `watch` channel so
// any number of readers can observe it; only the tracker writes it.
// Notifications fire on transitions into `Unavailable` and on the
// `Unavailable -> Available` recovery, never on a repeated confirmation.

use std::sync::Arc;

use hrsync_api::HrClient;
use serde::Serialize;
use strum::Display;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::model::Capability;
use crate::notify::{NotificationEvent, NotificationSink};

/// Reachability of one capability group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// No probe or outcome observed since start (or since the last reset).
    #[default]
    Unknown,
    Available,
    Unavailable,
}

/// The state change caused by one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Availability,
    pub to: Availability,
}

impl Transition {
    pub fn changed(self) -> bool {
        self.from != self.to
    }

    /// Newly unreachable. Mirrors must be cleared.
    pub fn entered_unavailable(self) -> bool {
        self.to == Availability::Unavailable && self.from != Availability::Unavailable
    }

    /// Back from a confirmed outage.
    pub fn restored(self) -> bool {
        self.from == Availability::Unavailable && self.to == Availability::Available
    }

    pub fn is_available(self) -> bool {
        self.to == Availability::Available
    }
}

/// Reachability state machine for one capability group.
pub struct AvailabilityTracker {
    capability: Capability,
    state: watch::Sender<Availability>,
    sink: Arc<dyn NotificationSink>,
}

impl AvailabilityTracker {
    pub fn new(capability: Capability, sink: Arc<dyn NotificationSink>) -> Self {
        let (state, _) = watch::channel(Availability::Unknown);
        Self {
            capability,
            state,
            sink,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn state(&self) -> Availability {
        *self.state.borrow()
    }

    pub fn is_available(&self) -> bool {
        self.state() == Availability::Available
    }

    pub fn subscribe(&self) -> watch::Receiver<Availability> {
        self.state.subscribe()
    }

    /// Record the outcome of a probe or of a substantive call.
    pub fn report(&self, reachable: bool) -> Transition {
        let to = if reachable {
            Availability::Available
        } else {
            Availability::Unavailable
        };

        let mut from = to;
        self.state.send_if_modified(|current| {
            from = *current;
            if *current == to {
                false
            } else {
                *current = to;
                true
            }
        });

        let transition = Transition { from, to };
        if transition.entered_unavailable() {
            warn!(capability = %self.capability, "capability unavailable");
            self.sink.handle(NotificationEvent::CapabilityUnavailable {
                capability: self.capability,
            });
        } else if transition.restored() {
            info!(capability = %self.capability, "capability restored");
            self.sink.handle(NotificationEvent::CapabilityRestored {
                capability: self.capability,
            });
        } else if transition.changed() {
            debug!(capability = %self.capability, state = ?to, "first availability observation");
        }
        transition
    }

    /// Probe the health endpoint and record the result.
    pub async fn probe(&self, client: &HrClient) -> Transition {
        let reachable = reachable(client).await;
        self.report(reachable)
    }

    /// Back to `Unknown`, silently.
    pub fn reset(&self) {
        self.state.send_replace(Availability::Unknown);
    }
}

impl std::fmt::Debug for AvailabilityTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvailabilityTracker")
            .field("capability", &self.capability)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Bounded-timeout reachability check. Never errors.
pub async fn reachable(client: &HrClient) -> bool {
    match client.check_health().await {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "health probe failed");
            false
        }
    }
}
