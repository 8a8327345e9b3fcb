//! Public configuration for the OpenAI client.

use std::time::Duration;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the API root.
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// Configuration for [`OpenAiClient`](crate::OpenAiClient).
///
/// # Example
///
/// ```
/// use uptick_openai::OpenAiConfig;
/// use std::time::Duration;
///
/// let config = OpenAiConfig::new()
///     .with_api_key("sk-test")
///     .with_timeout(Duration::from_secs(20));
/// assert!(config.has_api_key());
/// ```
#[derive(Clone)]
pub struct OpenAiConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) user_agent: String,
    /// Transport-level bound for any single request.
    pub(crate) timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: concat!("uptick-openai/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `OPENAI_API_KEY` and `OPENAI_BASE_URL`.
    ///
    /// A missing key is logged as a warning; calls will then fail upstream.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => config.api_key = Some(key),
            _ => tracing::warn!("{API_KEY_ENV} is not set; OpenAI calls will fail"),
        }

        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            if !base.trim().is_empty() {
                config.base_url = base;
            }
        }

        config
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
