// ── Reconnect orchestration ──
//
// Re-probes every capability group and refreshes every mirror in
// parallel. Only one reconnect runs at a time; a call made while one is
// outstanding returns `false` immediately and touches nothing.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::console::Console;
use crate::notify::NotificationEvent;

/// Admits one reconnect at a time.
#[derive(Debug, Default)]
pub struct ReconnectGate(AtomicBool);

impl ReconnectGate {
    pub fn try_enter(&self) -> Option<ReconnectPermit<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ReconnectPermit(&self.0))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Held for the duration of one reconnect.
#[derive(Debug)]
pub struct ReconnectPermit<'a>(&'a AtomicBool);

impl Drop for ReconnectPermit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Console {
    /// Probe and refresh every capability concurrently.
    ///
    /// Returns `true` only if every capability is reachable and every
    /// mirror reloaded. Returns `false` without doing anything when not
    /// signed in or when a reconnect is already running.
    pub async fn reconnect_all(&self) -> bool {
        let inner = self.inner();
        if !inner.session.is_authenticated() {
            debug!("reconnect requested while signed out");
            return false;
        }
        let Some(_permit) = inner.reconnect.try_enter() else {
            debug!("reconnect already in flight");
            return false;
        };

        let started = inner.sink.handle(NotificationEvent::ReconnectStarted);
        let (employees, departments, attendances, transfers) = tokio::join!(
            inner.employees.reconnect(),
            inner.departments.reconnect(),
            inner.attendances.reconnect(),
            inner.transfers.check_availability(),
        );
        inner.sink.dismiss(started);

        let ok = employees && departments && attendances && transfers;
        if ok {
            info!("reconnect succeeded");
            inner.sink.handle(NotificationEvent::ReconnectSucceeded);
        } else {
            warn!(employees, departments, attendances, transfers, "reconnect incomplete");
            inner.sink.handle(NotificationEvent::ReconnectFailed);
        }
        ok
    }

    pub fn is_reconnecting(&self) -> bool {
        self.inner().reconnect.is_active()
    }
}
