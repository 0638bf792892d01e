// ── Generic resource store ──
//
// Loads, mutates and re-synchronizes one entity collection.
//
// Every mutation is followed by a full reload rather than a local patch.
// Loads are tagged with a generation number: a slower, older load never
// overwrites the result of a newer one, and a reset cancels whatever is
// in flight so nothing stale lands in a cleared mirror.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use hrsync_api::HrClient;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{EntityMirror, Resource, lock};
use crate::availability::{self, Availability, AvailabilityTracker, Transition};
use crate::client::ClientHandle;
use crate::decode::{decode, decode_list, encode_payload, validate};
use crate::error::CoreError;
use crate::model::{Identified, MutationKind, Normalize};
use crate::notify::{NotificationEvent, NotificationHandle, NotificationSink};
use crate::stream::{MirrorStream, Snapshot};

/// Result of a successful mutation.
///
/// The mirror is not yet refreshed when this is returned; await
/// `refresh` to observe the reload.
#[derive(Debug)]
pub struct MutationOutcome<R> {
    /// The normalized record the server returned (or, for deletes, the
    /// mirror's copy of the removed record).
    pub record: R,
    /// The follow-up full reload. Resolves to its success flag.
    pub refresh: JoinHandle<bool>,
}

enum Commit {
    Applied,
    Superseded,
    Cancelled,
}

pub struct ResourceStore<R: Resource> {
    client: ClientHandle,
    sink: Arc<dyn NotificationSink>,
    tracker: AvailabilityTracker,
    mirror: EntityMirror<R>,
    /// Number of loads in flight.
    loading: watch::Sender<usize>,
    /// Generation of the most recently started load.
    requested: AtomicU64,
    /// Generation of the load whose result the mirror holds.
    applied: Mutex<u64>,
    /// Cancelled and replaced on reset.
    cancel: Mutex<CancellationToken>,
}

impl<R: Resource> ResourceStore<R> {
    pub fn new(client: ClientHandle, sink: Arc<dyn NotificationSink>) -> Self {
        let (loading, _) = watch::channel(0);
        Self {
            client,
            tracker: AvailabilityTracker::new(R::KIND.capability(), Arc::clone(&sink)),
            sink,
            mirror: EntityMirror::new(),
            loading,
            requested: AtomicU64::new(0),
            applied: Mutex::new(0),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    // ── Read access ──────────────────────────────────────────────────

    pub fn mirror(&self) -> &EntityMirror<R> {
        &self.mirror
    }

    pub fn snapshot(&self) -> Snapshot<R> {
        self.mirror.snapshot()
    }

    /// Mirror lookup; never touches the network.
    pub fn get(&self, id: i64) -> Option<Arc<R>> {
        self.mirror.get(id)
    }

    pub fn subscribe(&self) -> MirrorStream<R> {
        MirrorStream::new(self.mirror.subscribe())
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow() > 0
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<usize> {
        self.loading.subscribe()
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    pub fn availability(&self) -> Availability {
        self.tracker.state()
    }

    pub fn is_available(&self) -> bool {
        self.tracker.is_available()
    }

    // ── Load ─────────────────────────────────────────────────────────

    /// Probe, then fetch the full collection and replace the mirror.
    ///
    /// Returns `false` when the capability is unreachable, the fetch or
    /// decode failed (a `SyncFailed` notification is emitted and
    /// availability re-probed), or the load was cancelled by a reset.
    pub async fn load(&self) -> bool {
        self.load_under(self.cancel_token()).await
    }

    /// `load`, cancelled by whichever reset invalidates `cancel`.
    pub(crate) async fn load_under(&self, cancel: CancellationToken) -> bool {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        let _loading = LoadingGuard::enter(&self.loading);
        let client = self.client.current();

        let Some(reachable) = probe_unless_cancelled(&client, &cancel).await else {
            debug!(kind = %R::KIND, generation, "load cancelled during probe");
            return false;
        };
        if !self.observe(reachable).is_available() {
            debug!(kind = %R::KIND, "capability unavailable, skipping fetch");
            return false;
        }

        let context = R::KIND.api_context("getAll");
        let fetched = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(kind = %R::KIND, generation, "load cancelled during fetch");
                return false;
            }
            result = fetch_list::<R>(&client, R::KIND.resource(), &[], &context) => result,
        };

        match fetched {
            Ok(records) => {
                let count = records.len();
                match self.commit(generation, &cancel, records) {
                    Commit::Applied => {
                        debug!(kind = %R::KIND, generation, count, "mirror replaced");
                        true
                    }
                    Commit::Superseded => {
                        debug!(kind = %R::KIND, generation, "newer load already applied");
                        true
                    }
                    Commit::Cancelled => false,
                }
            }
            Err(err) => {
                if cancel.is_cancelled() {
                    return false;
                }
                warn!(kind = %R::KIND, error = %err, "load failed");
                self.sink.handle(NotificationEvent::SyncFailed {
                    kind: R::KIND,
                    reason: err.user_message(),
                });
                if let Some(reachable) = probe_unless_cancelled(&client, &cancel).await {
                    self.observe(reachable);
                }
                false
            }
        }
    }

    /// Re-probe and refresh; the per-store half of a reconnect.
    pub async fn reconnect(&self) -> bool {
        self.load().await
    }

    /// Run `load` as a background task.
    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<bool> {
        self.spawn_load_under(self.cancel_token())
    }

    /// A load tied to the session that started it. Already cancelled
    /// means a reset happened since; nothing is fetched.
    fn spawn_load_under(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<bool> {
        if cancel.is_cancelled() {
            return tokio::spawn(async { false });
        }
        let store = Arc::clone(self);
        tokio::spawn(async move { store.load_under(cancel).await })
    }

    fn commit(&self, generation: u64, cancel: &CancellationToken, records: Vec<R>) -> Commit {
        let mut applied = lock(&self.applied);
        if cancel.is_cancelled() {
            return Commit::Cancelled;
        }
        if generation <= *applied {
            return Commit::Superseded;
        }
        *applied = generation;
        self.mirror.replace(records);
        Commit::Applied
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn create(self: &Arc<Self>, payload: &R::Create) -> Result<MutationOutcome<R>, CoreError> {
        let started = self.begin(MutationKind::Create);
        let result = self.send_create(payload).await;
        self.finish(MutationKind::Create, started, result).await
    }

    pub async fn update(
        self: &Arc<Self>,
        id: i64,
        payload: &R::Update,
    ) -> Result<MutationOutcome<R>, CoreError> {
        let started = self.begin(MutationKind::Update);
        let result = self.send_update(id, payload).await;
        self.finish(MutationKind::Update, started, result).await
    }

    /// Delete a record the mirror knows about.
    ///
    /// Returns `Ok(None)` without any remote call when `id` is not in
    /// the mirror.
    pub async fn delete(self: &Arc<Self>, id: i64) -> Result<Option<MutationOutcome<R>>, CoreError> {
        let Some(existing) = self.mirror.get(id) else {
            debug!(kind = %R::KIND, id, "not in mirror, delete skipped");
            return Ok(None);
        };

        let started = self.begin(MutationKind::Delete);
        let client = self.client.current();
        let result = client
            .delete(&R::KIND.item_path(id))
            .await
            .map(|_| R::clone(&existing))
            .map_err(CoreError::from);
        self.finish(MutationKind::Delete, started, result).await.map(Some)
    }

    /// Fetch one record by id. Does not touch the mirror.
    pub async fn get_by_id(&self, id: i64) -> Result<R, CoreError> {
        let client = self.client.current();
        fetch_one::<R>(&client, id).await
    }

    async fn send_create(&self, payload: &R::Create) -> Result<R, CoreError> {
        let context = format!("{}.create.payload", R::KIND.schema_name());
        let body = encode_payload(payload, &context)?;

        let client = self.client.current();
        let raw = client.post(R::KIND.resource(), &body).await?;
        let record: R = decode(&raw, &R::KIND.api_context("create.response"))?;
        Ok(record.normalize(Utc::now()))
    }

    async fn send_update(&self, id: i64, payload: &R::Update) -> Result<R, CoreError> {
        let context = format!("{}.update.payload", R::KIND.schema_name());
        let body = encode_payload(payload, &context)?;

        let client = self.client.current();
        let raw = client.put(&R::KIND.item_path(id), &body).await?;

        match validate::<R>(&raw, &R::KIND.api_context("update.response")) {
            Ok(record) => Ok(record.normalize(Utc::now())),
            // A bare confirmation or an empty body: the server did not
            // echo the record, so read it back.
            Err(_) if matches!(raw, Value::String(_) | Value::Null) => {
                debug!(kind = %R::KIND, id, response = %raw, "update not echoed, fetching record");
                fetch_one::<R>(&client, id).await
            }
            Err(failure) => {
                failure.log();
                Err(failure.into())
            }
        }
    }

    fn begin(&self, operation: MutationKind) -> Started {
        Started {
            handle: self.sink.handle(NotificationEvent::MutationStarted {
                kind: R::KIND,
                operation,
            }),
            cancel: self.cancel_token(),
        }
    }

    async fn finish(
        self: &Arc<Self>,
        operation: MutationKind,
        started: Started,
        result: Result<R, CoreError>,
    ) -> Result<MutationOutcome<R>, CoreError> {
        let Started { handle, cancel } = started;
        self.sink.dismiss(handle);
        // A reset while the request was on the wire: the outcome still
        // reaches the caller, but nothing lands in the cleared store.
        let torn_down = cancel.is_cancelled();
        match result {
            Ok(record) => {
                info!(kind = %R::KIND, %operation, id = record.id(), "mutation succeeded");
                self.sink.handle(NotificationEvent::MutationSucceeded {
                    operation,
                    record: record.clone().into(),
                });
                if torn_down {
                    debug!(kind = %R::KIND, %operation, "store reset during mutation, no reload");
                } else {
                    self.observe(true);
                }
                Ok(MutationOutcome {
                    record,
                    refresh: self.spawn_load_under(cancel),
                })
            }
            Err(err) => {
                warn!(kind = %R::KIND, %operation, error = %err, "mutation failed");
                self.sink.handle(NotificationEvent::MutationFailed {
                    kind: R::KIND,
                    operation,
                    reason: err.user_message(),
                });
                if !torn_down {
                    self.reprobe_under(cancel).await;
                }
                Err(err)
            }
        }
    }

    // ── Availability ─────────────────────────────────────────────────

    /// Record an outcome; a fresh outage clears the mirror.
    fn observe(&self, reachable: bool) -> Transition {
        let transition = self.tracker.report(reachable);
        if transition.entered_unavailable() {
            self.mirror.clear();
        }
        transition
    }

    /// Probe the health endpoint and record the result.
    pub async fn reprobe(&self) -> Transition {
        let client = self.client.current();
        let reachable = availability::reachable(&client).await;
        self.observe(reachable)
    }

    /// Probe after a failed mutation. A recovered capability is reloaded.
    async fn reprobe_under(self: &Arc<Self>, cancel: CancellationToken) {
        let client = self.client.current();
        let Some(reachable) = probe_unless_cancelled(&client, &cancel).await else {
            return;
        };
        if self.observe(reachable).restored() {
            debug!(kind = %R::KIND, "capability restored, reloading");
            drop(self.spawn_load_under(cancel));
        }
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Drop the mirror and availability back to their initial state.
    ///
    /// In-flight loads are cancelled and their results discarded;
    /// mutations still on the wire neither report availability nor
    /// reload.
    pub fn reset(&self) {
        let _applied = lock(&self.applied);
        {
            let mut cancel = lock(&self.cancel);
            cancel.cancel();
            *cancel = CancellationToken::new();
        }
        self.mirror.clear();
        self.tracker.reset();
        debug!(kind = %R::KIND, "store reset");
    }

    pub(crate) fn cancel_token(&self) -> CancellationToken {
        lock(&self.cancel).clone()
    }

    pub(super) fn current_client(&self) -> Arc<HrClient> {
        self.client.current()
    }
}

impl<R: Resource> std::fmt::Debug for ResourceStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceStore")
            .field("kind", &R::KIND)
            .field("records", &self.mirror.len())
            .field("availability", &self.tracker.state())
            .finish_non_exhaustive()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

/// A mutation in progress: its progress notification and the reset
/// token current when it began.
struct Started {
    handle: NotificationHandle,
    cancel: CancellationToken,
}

struct LoadingGuard<'a>(&'a watch::Sender<usize>);

impl<'a> LoadingGuard<'a> {
    fn enter(count: &'a watch::Sender<usize>) -> Self {
        count.send_modify(|n| *n += 1);
        Self(count)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

async fn probe_unless_cancelled(client: &HrClient, cancel: &CancellationToken) -> Option<bool> {
    let reachable = tokio::select! {
        biased;
        () = cancel.cancelled() => return None,
        ok = availability::reachable(client) => ok,
    };
    (!cancel.is_cancelled()).then_some(reachable)
}

pub(crate) async fn fetch_list<R: Resource>(
    client: &HrClient,
    path: &str,
    params: &[(&str, String)],
    context: &str,
) -> Result<Vec<R>, CoreError> {
    let raw = if params.is_empty() {
        client.get(path).await?
    } else {
        client.get_with_params(path, params).await?
    };
    let now = Utc::now();
    Ok(decode_list::<R>(&raw, context)?
        .into_iter()
        .map(|record| record.normalize(now))
        .collect())
}

async fn fetch_one<R: Resource>(client: &HrClient, id: i64) -> Result<R, CoreError> {
    let raw = client.get(&R::KIND.item_path(id)).await.map_err(|e| {
        if e.is_not_found() {
            CoreError::NotFound { kind: R::KIND, id }
        } else {
            CoreError::from(e)
        }
    })?;
    let record: R = decode(&raw, &R::KIND.api_context("getById"))?;
    Ok(record.normalize(Utc::now()))
}
