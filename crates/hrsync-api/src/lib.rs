// hrsync-api: Async Rust client for the HR service REST API

pub mod base_url;
pub mod client;
pub mod error;
pub mod transport;

pub use base_url::{DEFAULT_API_BASE_URL, normalize_base_url};
pub use client::{HrClient, RawResponse, body_to_value};
pub use error::Error;
pub use transport::TransportConfig;
