//! Client configuration.

use std::time::Duration;

use crate::error::Error;
use crate::types::ServiceUrl;

/// Default base URL of the ArcGIS OAuth endpoints.
pub const DEFAULT_AUTH_URL: &str = "https://www.arcgis.com/sharing/oauth2";

/// Default base URL of the Geotrigger API.
pub const DEFAULT_API_URL: &str = "https://geotrigger.arcgis.com";

/// Default per-request HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and how a [`Client`](crate::Client) talks to the remote services.
///
/// # Example
///
/// ```
/// use geotrigger::Config;
///
/// let config = Config::new("http://localhost:9000/oauth2", "http://localhost:9000/api").unwrap();
/// assert_eq!(config.api_url().as_str(), "http://localhost:9000/api");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    auth_url: ServiceUrl,
    api_url: ServiceUrl,
    timeout: Duration,
}

impl Config {
    /// Create a configuration with custom base URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if either URL is invalid.
    pub fn new(auth_url: impl AsRef<str>, api_url: impl AsRef<str>) -> Result<Self, Error> {
        Ok(Self {
            auth_url: ServiceUrl::new(auth_url)?,
            api_url: ServiceUrl::new(api_url)?,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Override the per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL of the OAuth endpoints (`registerDevice`, `token`).
    pub fn auth_url(&self) -> &ServiceUrl {
        &self.auth_url
    }

    /// Base URL of the Geotrigger API.
    pub fn api_url(&self) -> &ServiceUrl {
        &self.api_url
    }

    /// Per-request HTTP timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_AUTH_URL, DEFAULT_API_URL).expect("default service URLs are valid")
    }
}
