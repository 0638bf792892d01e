// Shared transport configuration for building reqwest::Client instances.
//
// Every HrClient built from the same config shares timeout and
// user-agent settings, including clients rebuilt after the API
// address changes.

use std::time::Duration;

/// Bounded timeout for the `/health` probe.
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout applied to every functional request.
    pub timeout: Duration,
    /// Timeout applied to the reachability probe only.
    pub health_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("hrsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(crate::error::Error::Transport)
    }
}
