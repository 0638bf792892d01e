// Async HTTP client for the HR service REST API.
//
// Responses are returned untyped (`serde_json::Value`); decoding against
// entity schemas is the caller's job. Non-JSON bodies (a bare "OK") come
// back as `Value::String`, empty bodies as `Value::Null`.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::base_url::{display_base_url, normalize_base_url};
use crate::error::Error;
use crate::transport::TransportConfig;

/// An untyped response body.
pub type RawResponse = Value;

// ── Error response shape from the HR service ────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the HR service.
///
/// Attaches `Authorization: Bearer <token>` to every functional request
/// once a token has been installed with [`set_token`](Self::set_token).
/// The health probe is sent without credentials.
pub struct HrClient {
    http: reqwest::Client,
    base_url: Url,
    health_timeout: Duration,
    token: RwLock<Option<SecretString>>,
}

impl HrClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a raw base address and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            health_timeout: transport.health_timeout,
            token: RwLock::new(None),
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            health_timeout: crate::transport::DEFAULT_HEALTH_TIMEOUT,
            token: RwLock::new(None),
        })
    }

    /// Override the health probe timeout.
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// The normalized API base address.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Bearer token ─────────────────────────────────────────────────

    /// Install or clear the bearer token.
    pub fn set_token(&self, token: Option<SecretString>) {
        trace!(present = token.is_some(), "bearer token updated");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    /// The currently installed token, if any.
    pub fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.header(
                AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            ),
            None => builder,
        }
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative resource path (e.g. `"employees/4"`) onto the base.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let base = display_base_url(&self.base_url);
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.authorize(self.http.get(url)).send().await?;
        read_body(resp).await
    }

    pub async fn get_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self
            .authorize(self.http.get(url).query(params))
            .send()
            .await?;
        read_body(resp).await
    }

    pub async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.authorize(self.http.post(url).json(body)).send().await?;
        read_body(resp).await
    }

    pub async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.authorize(self.http.put(url).json(body)).send().await?;
        read_body(resp).await
    }

    pub async fn delete(&self, path: &str) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.authorize(self.http.delete(url)).send().await?;
        read_body(resp).await
    }

    // ── File transfer ────────────────────────────────────────────────

    /// Upload a file as `multipart/form-data` under the `file` field.
    pub async fn upload(
        &self,
        path: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<RawResponse, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (multipart, {} bytes)", contents.len());

        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_owned());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .authorize(self.http.post(url).multipart(form))
            .send()
            .await?;
        read_body(resp).await
    }

    /// Download a binary payload.
    pub async fn download(&self, path: &str) -> Result<Bytes, Error> {
        let url = self.url(path)?;
        debug!("GET {url} (binary)");

        let resp = self.authorize(self.http.get(url)).send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.bytes().await?)
        } else {
            Err(parse_error(status, resp).await)
        }
    }

    // ── Health ───────────────────────────────────────────────────────

    /// Probe `GET {base}/health` with the bounded health timeout.
    ///
    /// Any status below 400 counts as reachable.
    pub async fn check_health(&self) -> Result<(), Error> {
        ping_health(&self.http, &self.base_url, self.health_timeout).await
    }

    /// Normalize `raw` and probe its health endpoint without touching
    /// this client's own address. Returns the normalized address.
    pub async fn test_connection(&self, raw: &str) -> Result<Url, Error> {
        let candidate = normalize_base_url(raw)?;
        ping_health(&self.http, &candidate, self.health_timeout).await?;
        Ok(candidate)
    }
}

impl std::fmt::Debug for HrClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HrClient")
            .field("base_url", &self.base_url.as_str())
            .field("health_timeout", &self.health_timeout)
            .finish_non_exhaustive()
    }
}

// ── Response handling ────────────────────────────────────────────────

async fn ping_health(http: &reqwest::Client, base: &Url, timeout: Duration) -> Result<(), Error> {
    let url = Url::parse(&format!("{}/health", display_base_url(base)))?;
    trace!("GET {url} (health)");

    let resp = http.get(url).timeout(timeout).send().await.map_err(|e| {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            Error::Transport(e)
        }
    })?;

    let status = resp.status();
    if status.as_u16() >= 400 {
        return Err(Error::Unhealthy {
            status: status.as_u16(),
        });
    }
    Ok(())
}

async fn read_body(resp: reqwest::Response) -> Result<RawResponse, Error> {
    let status = resp.status();
    if status.is_success() {
        let text = resp.text().await?;
        Ok(body_to_value(&text))
    } else {
        Err(parse_error(status, resp).await)
    }
}

/// Interpret a response body: JSON when it parses, a string otherwise,
/// `null` when empty.
pub fn body_to_value(text: &str) -> RawResponse {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(text.to_owned()))
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Unauthorized;
    }

    let raw = resp.text().await.unwrap_or_default();

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        Error::Http {
            status: status.as_u16(),
            message: err
                .message
                .or(err.title)
                .unwrap_or_else(|| status.to_string()),
            code: err.code,
        }
    } else {
        Error::Http {
            status: status.as_u16(),
            message: if raw.trim().is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_is_null() {
        assert_eq!(body_to_value(""), Value::Null);
        assert_eq!(body_to_value("  \n"), Value::Null);
    }

    #[test]
    fn plain_text_body_is_string() {
        assert_eq!(body_to_value("OK"), Value::String("OK".into()));
    }

    #[test]
    fn json_body_is_parsed() {
        assert_eq!(body_to_value(r#"{"id":1}"#), serde_json::json!({ "id": 1 }));
        assert_eq!(body_to_value("[]"), serde_json::json!([]));
    }
}
