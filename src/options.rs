//! Client configuration: backend location, credentials and transport settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::ClientError;

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Timeout applied to ordinary REST calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout applied to a whole streaming chat request.
pub const DEFAULT_STREAM_TIMEOUT: Duration = Duration::from_secs(60);

const ENV_BASE_URL: &str = "AGENTDESK_BASE_URL";
const ENV_TOKEN: &str = "AGENTDESK_TOKEN";
const ENV_USER_ID: &str = "AGENTDESK_USER_ID";
const ENV_TIMEOUT_SECS: &str = "AGENTDESK_TIMEOUT_SECS";

/// A secret string type for sensitive data like bearer tokens.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Settings shared by every request the client makes.
///
/// # Example
/// ```rust
/// use agentdesk::options::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new("http://localhost:5000/api")
///     .with_token("dev-token-12345")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(options.base_url, "http://localhost:5000/api");
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend API root, without a trailing slash (e.g. `http://host:5000/api`)
    pub base_url: String,

    /// Bearer token sent in the `Authorization` header
    pub token: Option<SecretString>,

    /// Identifier of the signed-in user, stamped on locally built messages
    pub user_id: Option<String>,

    /// Timeout for REST calls
    pub timeout: Option<Duration>,

    /// Timeout for streaming chat calls
    pub stream_timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientOptions {
    /// Create options pointing at `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            user_id: None,
            timeout: Some(DEFAULT_TIMEOUT),
            stream_timeout: Some(DEFAULT_STREAM_TIMEOUT),
            proxy: None,
            extra_headers: None,
        }
    }

    /// Build options from `AGENTDESK_*` environment variables.
    ///
    /// Unset variables fall back to defaults. A timeout that is not a whole
    /// number of seconds is rejected.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ClientError> {
        let mut options = Self::new(lookup(ENV_BASE_URL).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()));

        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            options.token = Some(SecretString::new(token));
        }
        options.user_id = lookup(ENV_USER_ID).filter(|u| !u.is_empty());

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("{ENV_TIMEOUT_SECS} must be whole seconds, got {raw:?}"))
            })?;
            options.timeout = Some(Duration::from_secs(secs));
        }

        Ok(options)
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<SecretString>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the current user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the REST timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the streaming timeout.
    pub fn with_stream_timeout(mut self, timeout: Duration) -> Self {
        self.stream_timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
