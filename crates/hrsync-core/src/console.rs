// ── Console ──
//
// The constructed state container for one console: one store per
// mirrored kind, the shared file-transfer tracker, the session, and the
// swappable transport they all read through. Session transitions arm
// and tear down the whole synchronization core.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hrsync_api::base_url::display_base_url;
use hrsync_api::{DEFAULT_API_BASE_URL, HrClient};
use secrecy::SecretString;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::client::ClientHandle;
use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::model::{Attendance, AuthMode, AuthUser, Department, Employee};
use crate::notify::{NotificationEvent, NotificationSink};
use crate::reconnect::ReconnectGate;
use crate::session::{Session, SessionController};
use crate::store::{Resource, ResourceStore};
use crate::transfer::FileTransferTracker;

/// Outcome of an accepted API address change.
#[derive(Debug)]
pub struct BaseUrlChange {
    /// The normalized address now in use.
    pub url: Url,
    /// Reconnect started because a session is open.
    pub reconnect: Option<JoinHandle<bool>>,
}

/// Cheaply cloneable handle to the synchronization core.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

pub(crate) struct ConsoleInner {
    pub(crate) config: ConsoleConfig,
    pub(crate) client: ClientHandle,
    pub(crate) sink: Arc<dyn NotificationSink>,
    pub(crate) session: SessionController,
    pub(crate) employees: Arc<ResourceStore<Employee>>,
    pub(crate) departments: Arc<ResourceStore<Department>>,
    pub(crate) attendances: Arc<ResourceStore<Attendance>>,
    pub(crate) transfers: FileTransferTracker,
    pub(crate) reconnect: ReconnectGate,
}

impl Console {
    /// Build the transport from `config` and wire every component to it.
    pub fn new(config: ConsoleConfig, sink: Arc<dyn NotificationSink>) -> Result<Self, CoreError> {
        let client = HrClient::new(&config.base_url, &config.transport())?;
        Ok(Self::with_client(config, client, sink))
    }

    /// Wire every component to an existing client.
    pub fn with_client(
        config: ConsoleConfig,
        client: HrClient,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let client = ClientHandle::new(client);

        let inner = ConsoleInner {
            employees: new_store(&client, &sink),
            departments: new_store(&client, &sink),
            attendances: new_store(&client, &sink),
            transfers: FileTransferTracker::new(
                client.clone(),
                Arc::clone(&sink),
                config.export_dir.clone(),
            ),
            session: SessionController::new(),
            reconnect: ReconnectGate::default(),
            config,
            client,
            sink,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    pub(crate) fn inner(&self) -> &ConsoleInner {
        &self.inner
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn employees(&self) -> &Arc<ResourceStore<Employee>> {
        &self.inner.employees
    }

    pub fn departments(&self) -> &Arc<ResourceStore<Department>> {
        &self.inner.departments
    }

    pub fn attendances(&self) -> &Arc<ResourceStore<Attendance>> {
        &self.inner.attendances
    }

    pub fn transfers(&self) -> &FileTransferTracker {
        &self.inner.transfers
    }

    pub fn session(&self) -> Session {
        self.inner.session.current()
    }

    pub fn session_controller(&self) -> &SessionController {
        &self.inner.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.is_authenticated()
    }

    /// The API address currently in use.
    pub fn base_url(&self) -> Url {
        self.inner.client.current().base_url().clone()
    }

    // ── Session lifecycle ────────────────────────────────────────────

    pub fn open_auth(&self, mode: AuthMode) {
        self.inner.session.open_auth(mode);
    }

    pub fn close_auth(&self) {
        self.inner.session.close_auth();
    }

    /// Install the bearer token and enter `Authenticated`.
    ///
    /// On the transition, every store loads and the file-transfer
    /// capability is probed, all in parallel; the returned handle
    /// resolves once they have all settled. Signing in again while
    /// already authenticated only replaces the token and returns `None`.
    pub fn login(&self, token: SecretString, user: Option<AuthUser>) -> Option<JoinHandle<bool>> {
        self.inner.client.set_token(Some(token.clone()));
        if !self.inner.session.sign_in(token, user) {
            debug!("already authenticated, token replaced");
            return None;
        }

        let console = self.clone();
        Some(tokio::spawn(async move { console.load_all().await }))
    }

    /// Enter `Anonymous`: drop the token and reset every component.
    pub fn logout(&self) {
        self.inner.session.sign_out();
        self.inner.client.set_token(None);
        self.reset_all();
    }

    /// Clear every mirror, availability flag and in-flight transfer
    /// flag. In-flight loads are cancelled.
    pub fn reset_all(&self) {
        self.inner.employees.reset();
        self.inner.departments.reset();
        self.inner.attendances.reset();
        self.inner.transfers.reset();
        info!("synchronization state reset");
    }

    /// Load every store and probe file transfer, in parallel.
    pub async fn load_all(&self) -> bool {
        let (employees, departments, attendances, transfers) = tokio::join!(
            self.inner.employees.load(),
            self.inner.departments.load(),
            self.inner.attendances.load(),
            self.inner.transfers.check_availability(),
        );
        employees && departments && attendances && transfers
    }

    // ── API address ──────────────────────────────────────────────────

    /// Test `raw` and, if it answers, switch every component to it.
    ///
    /// The old transport stays in place when the test fails.
    pub async fn set_api_base_url(&self, raw: &str) -> Result<BaseUrlChange, CoreError> {
        let sink = &self.inner.sink;
        let testing = sink.handle(NotificationEvent::BaseUrlTesting {
            url: raw.trim().to_owned(),
        });

        let tested = match self.inner.client.current().test_connection(raw).await {
            Ok(url) => self.install_base_url(&url).map(|()| url),
            Err(e) => Err(CoreError::from(e)),
        };
        sink.dismiss(testing);

        match tested {
            Ok(url) => {
                let display = display_base_url(&url);
                sink.handle(NotificationEvent::BaseUrlSaved { url: display });
                let reconnect = self.is_authenticated().then(|| {
                    let console = self.clone();
                    tokio::spawn(async move { console.reconnect_all().await })
                });
                Ok(BaseUrlChange { url, reconnect })
            }
            Err(err) => {
                warn!(candidate = raw, error = %err, "API address rejected");
                sink.handle(NotificationEvent::BaseUrlFailed {
                    url: raw.trim().to_owned(),
                    reason: err.user_message(),
                });
                Err(err)
            }
        }
    }

    /// Switch back to the default API address without testing it.
    pub fn reset_api_base_url(&self) -> Result<Url, CoreError> {
        let url = hrsync_api::normalize_base_url(DEFAULT_API_BASE_URL)?;
        self.install_base_url(&url)?;
        Ok(url)
    }

    fn install_base_url(&self, url: &Url) -> Result<(), CoreError> {
        let client = HrClient::new(url.as_str(), &self.inner.config.transport())?;
        self.inner.client.replace(client);
        Ok(())
    }

    // ── File transfer ────────────────────────────────────────────────

    pub async fn import_employees(&self, path: &Path) -> Result<(), CoreError> {
        self.inner.transfers.import(&self.inner.employees, path).await
    }

    pub async fn import_departments(&self, path: &Path) -> Result<(), CoreError> {
        self.inner.transfers.import(&self.inner.departments, path).await
    }

    pub async fn export_employees(&self) -> Result<PathBuf, CoreError> {
        self.inner.transfers.export::<Employee>().await
    }

    pub async fn export_departments(&self) -> Result<PathBuf, CoreError> {
        self.inner.transfers.export::<Department>().await
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("base_url", &self.base_url().as_str())
            .field("authenticated", &self.is_authenticated())
            .field("employees", &self.inner.employees)
            .field("departments", &self.inner.departments)
            .field("attendances", &self.inner.attendances)
            .field("transfers", &self.inner.transfers)
            .finish_non_exhaustive()
    }
}

fn new_store<R: Resource>(
    client: &ClientHandle,
    sink: &Arc<dyn NotificationSink>,
) -> Arc<ResourceStore<R>> {
    Arc::new(ResourceStore::new(client.clone(), Arc::clone(sink)))
}
