// ── Bulk file transfer ──
//
// Spreadsheet import and export for employees and departments. One
// availability tracker covers every transfer direction and kind. After
// a failed transfer the tracker is re-probed, and a transfer never
// starts against a capability last seen unavailable without probing
// first.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::availability::{Availability, AvailabilityTracker};
use crate::client::ClientHandle;
use crate::error::CoreError;
use crate::model::{Capability, EntityKind};
use crate::notify::{NotificationEvent, NotificationSink, TransferDirection};
use crate::store::{ResourceStore, Transferable, lock};

const DEFAULT_IMPORT_NAME: &str = "import.xlsx";

type Flags = Mutex<HashMap<(EntityKind, TransferDirection), usize>>;

pub struct FileTransferTracker {
    client: ClientHandle,
    sink: Arc<dyn NotificationSink>,
    tracker: AvailabilityTracker,
    in_flight: Flags,
    export_dir: PathBuf,
    /// Cancelled and replaced on reset.
    cancel: Mutex<CancellationToken>,
}

impl FileTransferTracker {
    pub fn new(client: ClientHandle, sink: Arc<dyn NotificationSink>, export_dir: PathBuf) -> Self {
        Self {
            client,
            tracker: AvailabilityTracker::new(Capability::FileTransfer, Arc::clone(&sink)),
            sink,
            in_flight: Mutex::new(HashMap::new()),
            export_dir,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn tracker(&self) -> &AvailabilityTracker {
        &self.tracker
    }

    pub fn is_available(&self) -> bool {
        self.tracker.is_available()
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    /// Whether a transfer of `kind` in `direction` is running.
    pub fn is_in_flight(&self, kind: EntityKind, direction: TransferDirection) -> bool {
        lock(&self.in_flight)
            .get(&(kind, direction))
            .is_some_and(|n| *n > 0)
    }

    /// Probe the transfer capability.
    pub async fn check_availability(&self) -> bool {
        let client = self.client.current();
        self.tracker.probe(&client).await.is_available()
    }

    /// Upload a spreadsheet to `{resource}/import`, then reload `store`.
    pub async fn import<R: Transferable>(
        &self,
        store: &ResourceStore<R>,
        path: &Path,
    ) -> Result<(), CoreError> {
        let direction = TransferDirection::Import;
        let cancel = lock(&self.cancel).clone();
        let store_cancel = store.cancel_token();
        let _flag = FlagGuard::raise(&self.in_flight, R::KIND, direction);
        let started = self.sink.handle(NotificationEvent::TransferStarted {
            kind: R::KIND,
            direction,
        });

        let result = self.upload(R::KIND, path).await;
        self.sink.dismiss(started);

        match result {
            Ok(()) => {
                info!(kind = %R::KIND, path = %path.display(), "import succeeded");
                self.sink.handle(NotificationEvent::TransferSucceeded {
                    kind: R::KIND,
                    direction,
                    path: None,
                });
                if cancel.is_cancelled() || store_cancel.is_cancelled() {
                    debug!(kind = %R::KIND, "reset during import, no reload");
                    return Ok(());
                }
                self.tracker.report(true);
                if !store.load_under(store_cancel).await {
                    debug!(kind = %R::KIND, "reload after import did not complete");
                }
                Ok(())
            }
            Err(err) => Err(self.failed(R::KIND, direction, &cancel, err).await),
        }
    }

    /// Download `{resource}/export` and write it into the export
    /// directory. Returns the written path.
    pub async fn export<R: Transferable>(&self) -> Result<PathBuf, CoreError> {
        let direction = TransferDirection::Export;
        let cancel = lock(&self.cancel).clone();
        let _flag = FlagGuard::raise(&self.in_flight, R::KIND, direction);
        let started = self.sink.handle(NotificationEvent::TransferStarted {
            kind: R::KIND,
            direction,
        });

        let result = self.download(R::KIND).await;
        self.sink.dismiss(started);

        match result {
            Ok(path) => {
                info!(kind = %R::KIND, path = %path.display(), "export written");
                self.sink.handle(NotificationEvent::TransferSucceeded {
                    kind: R::KIND,
                    direction,
                    path: Some(path.clone()),
                });
                if !cancel.is_cancelled() {
                    self.tracker.report(true);
                }
                Ok(path)
            }
            Err(err) => Err(self.failed(R::KIND, direction, &cancel, err).await),
        }
    }

    /// Back to `Unknown`, with every in-flight flag lowered.
    pub fn reset(&self) {
        {
            let mut cancel = lock(&self.cancel);
            cancel.cancel();
            *cancel = CancellationToken::new();
        }
        lock(&self.in_flight).clear();
        self.tracker.reset();
    }

    // ── Internals ────────────────────────────────────────────────────

    async fn upload(&self, kind: EntityKind, path: &Path) -> Result<(), CoreError> {
        self.ensure_available().await?;

        let contents = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or(DEFAULT_IMPORT_NAME);

        let client = self.client.current();
        client
            .upload(&format!("{}/import", kind.resource()), file_name, contents)
            .await?;
        Ok(())
    }

    async fn download(&self, kind: EntityKind) -> Result<PathBuf, CoreError> {
        self.ensure_available().await?;

        let client = self.client.current();
        let bytes = client
            .download(&format!("{}/export", kind.resource()))
            .await?;

        tokio::fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(export_file_name(kind));
        tokio::fs::write(&path, &bytes).await?;
        Ok(path)
    }

    /// A capability last seen unavailable must be re-probed before use.
    async fn ensure_available(&self) -> Result<(), CoreError> {
        if self.tracker.state() == Availability::Unavailable && !self.check_availability().await {
            return Err(CoreError::Unavailable {
                capability: Capability::FileTransfer,
            });
        }
        Ok(())
    }

    async fn failed(
        &self,
        kind: EntityKind,
        direction: TransferDirection,
        cancel: &CancellationToken,
        err: CoreError,
    ) -> CoreError {
        warn!(%kind, ?direction, error = %err, "transfer failed");
        self.sink.handle(NotificationEvent::TransferFailed {
            kind,
            direction,
            reason: err.user_message(),
        });
        // Already probed when the capability was found unavailable.
        if !cancel.is_cancelled() && !matches!(err, CoreError::Unavailable { .. }) {
            self.check_availability().await;
        }
        err
    }
}

impl std::fmt::Debug for FileTransferTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTransferTracker")
            .field("availability", &self.tracker.state())
            .field("export_dir", &self.export_dir)
            .finish_non_exhaustive()
    }
}

/// `{resource}-{UTC timestamp}.xlsx`
pub fn export_file_name(kind: EntityKind) -> String {
    format!(
        "{}-{}.xlsx",
        kind.resource(),
        Utc::now().format("%Y-%m-%dT%H-%M-%SZ")
    )
}

/// Raises an in-flight flag for its lifetime.
struct FlagGuard<'a> {
    flags: &'a Flags,
    key: (EntityKind, TransferDirection),
}

impl<'a> FlagGuard<'a> {
    fn raise(flags: &'a Flags, kind: EntityKind, direction: TransferDirection) -> Self {
        let key = (kind, direction);
        *lock(flags).entry(key).or_insert(0) += 1;
        Self { flags, key }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        let mut flags = lock(self.flags);
        if let Some(count) = flags.get_mut(&self.key) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                flags.remove(&self.key);
            }
        }
    }
}
