//! Service base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for one of the remote services.
///
/// Used for both the OAuth endpoint (`https://www.arcgis.com/sharing/oauth2`)
/// and the Geotrigger API (`https://geotrigger.arcgis.com`).
///
/// URLs must use HTTPS, or HTTP for localhost. A trailing slash is dropped so
/// that [`ServiceUrl::endpoint`] always produces a single separator.
///
/// # Example
///
/// ```
/// use geotrigger::ServiceUrl;
///
/// let api = ServiceUrl::new("https://geotrigger.arcgis.com/").unwrap();
/// assert_eq!(api.endpoint("trigger/list"), "https://geotrigger.arcgis.com/trigger/list");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    /// Create a new service URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ServiceUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        Ok(Self(url))
    }

    /// Returns the URL for a path below this base.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string, without a trailing slash.
    pub fn as_str(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ServiceUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ServiceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ServiceUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ServiceUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ServiceUrl {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let url = ServiceUrl::new("https://geotrigger.arcgis.com").unwrap();
        assert_eq!(url.host(), Some("geotrigger.arcgis.com"));
    }

    #[test]
    fn valid_localhost_http() {
        let url = ServiceUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(url.host(), Some("127.0.0.1"));
    }

    #[test]
    fn endpoint_construction_with_path_base() {
        let url = ServiceUrl::new("https://www.arcgis.com/sharing/oauth2").unwrap();
        assert_eq!(
            url.endpoint("registerDevice"),
            "https://www.arcgis.com/sharing/oauth2/registerDevice"
        );
    }

    #[test]
    fn normalizes_slashes_in_endpoint() {
        let url = ServiceUrl::new("https://geotrigger.arcgis.com/").unwrap();
        assert_eq!(
            url.endpoint("/device/update"),
            "https://geotrigger.arcgis.com/device/update"
        );
        assert_eq!(url.to_string(), "https://geotrigger.arcgis.com");
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ServiceUrl::new("http://geotrigger.arcgis.com").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ServiceUrl::new("/trigger/list").is_err());
    }

    #[test]
    fn rejects_query_string() {
        assert!(ServiceUrl::new("https://geotrigger.arcgis.com/?f=json").is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let url: ServiceUrl = serde_json::from_str("\"https://geotrigger.arcgis.com\"").unwrap();
        assert_eq!(
            serde_json::to_string(&url).unwrap(),
            "\"https://geotrigger.arcgis.com\""
        );
    }
}
