// ── Shared transport handle ──
//
// Every store and tracker reads the transport through one `ClientHandle`
// so that changing the API address swaps the client for all of them at
// once. In-flight calls keep the client they started with.

use std::sync::Arc;

use arc_swap::ArcSwap;
use hrsync_api::HrClient;
use secrecy::SecretString;
use tracing::info;

#[derive(Clone)]
pub struct ClientHandle {
    inner: Arc<ArcSwap<HrClient>>,
}

impl ClientHandle {
    pub fn new(client: HrClient) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(client)),
        }
    }

    /// The client to use for the next call.
    pub fn current(&self) -> Arc<HrClient> {
        self.inner.load_full()
    }

    /// Swap in a new client, carrying the bearer token over.
    pub fn replace(&self, client: HrClient) {
        client.set_token(self.current().token());
        info!(base_url = %client.base_url(), "transport replaced");
        self.inner.store(Arc::new(client));
    }

    pub fn set_token(&self, token: Option<SecretString>) {
        self.current().set_token(token);
    }
}

impl std::fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ClientHandle").field(&self.current()).finish()
    }
}
