// ── Session state ──
//
// `Anonymous -> login -> Authenticated -> logout -> Anonymous`. The
// controller only records the state; arming and tearing down the
// synchronization core on each transition is the console's job.

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::info;

use crate::model::{AuthMode, AuthUser};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub is_authenticated: bool,
    /// Authentication form awaiting input, if any.
    pub pending_auth_mode: Option<AuthMode>,
    pub access_token: Option<SecretString>,
    pub user: Option<AuthUser>,
}

#[derive(Debug)]
pub struct SessionController {
    state: watch::Sender<Session>,
}

impl SessionController {
    pub fn new() -> Self {
        let (state, _) = watch::channel(Session::default());
        Self { state }
    }

    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn open_auth(&self, mode: AuthMode) {
        self.state
            .send_if_modified(|s| s.pending_auth_mode.replace(mode) != Some(mode));
    }

    pub fn close_auth(&self) {
        self.state
            .send_if_modified(|s| s.pending_auth_mode.take().is_some());
    }

    /// Enter `Authenticated`. Returns `true` if the session was anonymous.
    pub fn sign_in(&self, token: SecretString, user: Option<AuthUser>) -> bool {
        let mut entered = false;
        self.state.send_modify(|s| {
            entered = !s.is_authenticated;
            s.is_authenticated = true;
            s.pending_auth_mode = None;
            s.access_token = Some(token);
            s.user = user;
        });
        if entered {
            info!("session authenticated");
        }
        entered
    }

    /// Enter `Anonymous`. Returns `true` if the session was authenticated.
    pub fn sign_out(&self) -> bool {
        let mut left = false;
        self.state.send_modify(|s| {
            left = s.is_authenticated;
            *s = Session::default();
        });
        if left {
            info!("session closed");
        }
        left
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
