//! Remote handshake with the Channel3 backend.
//!
//! One synchronous outbound HTTPS POST carries the credential quadruple plus
//! merchant id and store URL to Channel3. The response is classified into
//! success, already-connected, or failure-with-detail; there is no retry —
//! failures surface to the administrator, who re-submits the connect form.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use crate::{
    config::{CONFIG_API_URL, ConfigBackend, ConfigScope},
    error::{BridgeError, Result},
    provision::CredentialSet,
};

/// Production Channel3 API origin.
pub const DEFAULT_BASE_URL: &str = "https://internal.trychannel3.com";

/// Path of the connect endpoint, relative to the API origin.
pub(crate) const CONNECT_PATH: &str = "/v0/magento/connect-via-module";

/// HTTP client configuration for calls to Channel3.
///
/// TOML-deserializable with defaults, so embedding binaries can expose it in
/// their own configuration files:
///
/// ```toml
/// [channel3]
/// base_url = "https://staging.trychannel3.com"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API origin. Plain `http` is accepted to reach non-production
    /// endpoints; the production default is HTTPS with certificate
    /// verification.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Validates configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] if `base_url` is not an
    /// http(s) URL or timeout values are outside valid ranges:
    /// - `timeout_secs`: 1-300
    /// - `connect_timeout_secs`: 1-60
    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.base_url)?;
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(BridgeError::InvalidConfig(
                "timeout_secs must be between 1 and 300".to_owned(),
            ));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(BridgeError::InvalidConfig(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Applies the `api_url` override stored in the host configuration, if
    /// any. Trailing slashes are trimmed; the override must still be an
    /// http(s) URL.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::StateWrite`] if the config store fails, or
    /// [`BridgeError::InvalidConfig`] if the stored override is not a URL.
    pub fn resolved(mut self, config: &dyn ConfigBackend, scope: ConfigScope) -> Result<Self> {
        if let Some(raw) = config.get(CONFIG_API_URL, scope)? {
            let trimmed = raw.trim().trim_end_matches('/');
            if !trimmed.is_empty() {
                validate_base_url(trimmed)?;
                self.base_url = trimmed.to_owned();
            }
        }
        Ok(self)
    }

    /// Returns the total timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the connect timeout as a [`Duration`].
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn validate_base_url(base_url: &str) -> Result<()> {
    let url = Url::parse(base_url)
        .map_err(|e| BridgeError::InvalidConfig(format!("invalid base_url '{base_url}': {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(BridgeError::InvalidConfig(format!(
            "base_url must use http or https, got: {}",
            url.scheme()
        )));
    }
    Ok(())
}

/// Creates a configured HTTP client with connection pooling.
///
/// Certificate verification stays enabled; the timeouts come from the
/// supplied configuration.
pub(crate) fn build_http_client(config: &ClientConfig) -> Result<Client> {
    Client::builder()
        .pool_max_idle_per_host(10)
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| BridgeError::InvalidConfig(format!("failed to build HTTP client: {e}")))
}

/// The connect request body.
///
/// Borrows everything from the caller so credential material is not copied
/// around; serialized once, sent once, never persisted.
#[derive(Debug, Serialize)]
pub struct HandshakePayload<'a> {
    /// The 4-character merchant id.
    pub merchant_id: &'a str,
    /// Public base URL of the storefront being linked.
    pub store_url: &'a str,
    /// OAuth1 consumer key.
    pub consumer_key: &'a str,
    /// OAuth1 consumer secret.
    pub consumer_secret: &'a str,
    /// Access token string.
    pub access_token: &'a str,
    /// Access token secret.
    pub access_token_secret: &'a str,
}

impl<'a> HandshakePayload<'a> {
    /// Assembles the request body from its parts.
    #[must_use]
    pub fn new(merchant_id: &'a str, store_url: &'a str, credentials: &'a CredentialSet) -> Self {
        Self {
            merchant_id,
            store_url,
            consumer_key: &credentials.consumer_key,
            consumer_secret: &credentials.consumer_secret,
            access_token: &credentials.access_token,
            access_token_secret: &credentials.access_token_secret,
        }
    }
}

/// Error body shape returned by the Channel3 backend on failures.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Classifies a connect response into the outcome shown to the administrator.
///
/// - 200: accepted.
/// - 409: this store is already linked (distinct, user-actionable).
/// - anything else: the backend's `detail` message when the body carries one,
///   otherwise a generic failure naming the status code.
pub(crate) fn classify(status: u16, body: &str) -> Result<()> {
    match status {
        200 => Ok(()),
        409 => Err(BridgeError::AlreadyConnected),
        code => {
            let detail = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|parsed| parsed.detail)
                .unwrap_or_else(|| format!("Connection failed (HTTP {code})"));
            Err(BridgeError::HandshakeFailed(detail))
        }
    }
}

/// Seam between the orchestrator and the Channel3 backend.
///
/// [`ConnectClient`] is the real implementation; tests substitute stubs.
#[allow(
    async_fn_in_trait,
    reason = "used through generic bounds within this crate; callers need no auxiliary Send bounds"
)]
pub trait Handshake {
    /// Posts the credential payload to Channel3 and classifies the response.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HandshakeTransport`],
    /// [`BridgeError::AlreadyConnected`], or [`BridgeError::HandshakeFailed`]
    /// per the classification rules.
    async fn handshake(&self, payload: &HandshakePayload<'_>) -> Result<()>;
}

/// HTTP client for the Channel3 connect endpoint.
#[derive(Debug, Clone)]
pub struct ConnectClient {
    http: Client,
    base_url: String,
}

impl ConnectClient {
    /// Creates a client against the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::InvalidConfig`] if the configuration is invalid
    /// or the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = build_http_client(&config)?;
        Ok(Self { http, base_url: config.base_url })
    }

    /// Full URL of the connect endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}{CONNECT_PATH}", self.base_url)
    }
}

impl Handshake for ConnectClient {
    async fn handshake(&self, payload: &HandshakePayload<'_>) -> Result<()> {
        info!(merchant_id = payload.merchant_id, endpoint = %self.endpoint(), "posting connect handshake");
        let response = self
            .http
            .post(self.endpoint())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| BridgeError::HandshakeTransport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        info!(status, "connect handshake answered");
        classify(status, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MemoryConfigBackend;

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_from_toml() {
        let toml = r#"
            base_url = "https://staging.trychannel3.com"
            timeout_secs = 5
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.base_url, "https://staging.trychannel3.com");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.connect_timeout_secs, 10);
    }

    #[test]
    fn test_client_config_rejects_zero_timeout() {
        let config = ClientConfig { timeout_secs: 0, ..ClientConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_client_config_rejects_non_http_scheme() {
        let config = ClientConfig { base_url: "ftp://example.com".to_owned(), ..ClientConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolved_applies_config_override() {
        let backend = MemoryConfigBackend::new();
        backend
            .set(CONFIG_API_URL, "https://staging.trychannel3.com/", ConfigScope::Default)
            .unwrap();

        let config =
            ClientConfig::default().resolved(&backend, ConfigScope::Store(1)).unwrap();
        assert_eq!(config.base_url, "https://staging.trychannel3.com");
    }

    #[test]
    fn test_resolved_keeps_default_without_override() {
        let backend = MemoryConfigBackend::new();
        let config = ClientConfig::default().resolved(&backend, ConfigScope::Default).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolved_rejects_garbage_override() {
        let backend = MemoryConfigBackend::new();
        backend.set(CONFIG_API_URL, "not a url", ConfigScope::Default).unwrap();

        let result = ClientConfig::default().resolved(&backend, ConfigScope::Default);
        assert!(matches!(result, Err(BridgeError::InvalidConfig(_))));
    }

    #[test]
    fn test_classify_success() {
        assert!(classify(200, "").is_ok());
    }

    #[test]
    fn test_classify_conflict() {
        let error = classify(409, "").unwrap_err();
        assert!(matches!(error, BridgeError::AlreadyConnected));
        assert!(error.to_string().contains("already connected"));
    }

    #[test]
    fn test_classify_failure_with_detail() {
        let error = classify(422, r#"{"detail": "Merchant AB12 does not exist."}"#).unwrap_err();
        assert_eq!(error.to_string(), "Merchant AB12 does not exist.");
    }

    #[test]
    fn test_classify_failure_without_detail() {
        let error = classify(500, "upstream exploded").unwrap_err();
        assert_eq!(error.to_string(), "Connection failed (HTTP 500)");
    }

    #[test]
    fn test_classify_failure_with_null_detail() {
        let error = classify(502, r#"{"detail": null}"#).unwrap_err();
        assert_eq!(error.to_string(), "Connection failed (HTTP 502)");
    }

    #[test]
    fn test_payload_serialization_field_names() {
        let credentials = CredentialSet {
            consumer_key: "ck".to_owned(),
            consumer_secret: "cs".to_owned(),
            access_token: "at".to_owned(),
            access_token_secret: "ats".to_owned(),
        };
        let payload = HandshakePayload::new("AB12", "https://shop.example.com/", &credentials);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["merchant_id"], "AB12");
        assert_eq!(json["store_url"], "https://shop.example.com/");
        assert_eq!(json["consumer_key"], "ck");
        assert_eq!(json["consumer_secret"], "cs");
        assert_eq!(json["access_token"], "at");
        assert_eq!(json["access_token_secret"], "ats");
    }

    #[test]
    fn test_endpoint_path() {
        let client = ConnectClient::new().unwrap();
        assert_eq!(
            client.endpoint(),
            "https://internal.trychannel3.com/v0/magento/connect-via-module"
        );
    }
}
