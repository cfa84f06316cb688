use std::time::Duration;

/// Crate version, reported in the default User-Agent.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ENDPOINT: &str = "https://api.vector.bytedance.com";
pub const DEFAULT_REGION: &str = "cn-beijing";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_RETRIES: i32 = 3;

/// Settings shared by every call made through one [`crate::Client`].
///
/// Unset or out-of-range values are normalized when the transport is built:
/// an empty region falls back to [`DEFAULT_REGION`], a zero timeout to
/// [`DEFAULT_TIMEOUT`], a negative retry count to zero. The endpoint is the
/// only required field.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub region: String,
    pub timeout: Duration,
    pub max_retries: i32,
    /// Defaults to `vikingdb-rust-sdk/<version>`.
    pub user_agent: Option<String>,
    /// Use this client instead of building one. Its connection pool is shared
    /// with whoever else holds it.
    pub http_client: Option<reqwest::Client>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            user_agent: None,
            http_client: None,
        }
    }
}

impl Config {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub(crate) fn default_user_agent() -> String {
        format!("vikingdb-rust-sdk/{}", VERSION)
    }
}
