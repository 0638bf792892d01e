// ── Runtime console configuration ──
//
// Describes how the core reaches the HR service and where exports land.
// Never touches disk: the CLI (or any other front end) resolves
// preferences and hands a `ConsoleConfig` in.

use std::path::PathBuf;
use std::time::Duration;

use hrsync_api::{DEFAULT_API_BASE_URL, TransportConfig};

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API base address, normalized when the client is built.
    pub base_url: String,
    /// Timeout for functional requests.
    pub timeout: Duration,
    /// Timeout for the `/health` probe.
    pub health_timeout: Duration,
    /// Directory receiving exported files.
    pub export_dir: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeout: transport.timeout,
            health_timeout: transport.health_timeout,
            export_dir: PathBuf::from("."),
        }
    }
}

impl ConsoleConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            health_timeout: self.health_timeout,
        }
    }
}
