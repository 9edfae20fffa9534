//! Client credentials type.

use std::fmt;

use super::session::SessionKind;

/// Credentials identifying a Geotrigger consumer.
///
/// A device is identified by the application's `client_id` alone; an
/// application additionally carries its `client_secret`.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use geotrigger::Credentials;
///
/// let creds = Credentials::application("my-client-id", "my-secret");
/// assert_eq!(creds.client_id(), "my-client-id");
/// assert!(!format!("{:?}", creds).contains("my-secret"));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    client_id: String,
    client_secret: Option<String>,
}

impl Credentials {
    /// Credentials for an anonymous device registered under `client_id`.
    pub fn device(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
        }
    }

    /// Credentials for an application authenticating with its secret.
    pub fn application(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
        }
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret, if these are application credentials.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    /// The identity mode these credentials belong to.
    pub fn kind(&self) -> SessionKind {
        if self.client_secret.is_some() {
            SessionKind::Application
        } else {
            SessionKind::Device
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret = self.client_secret.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &secret)
            .finish()
    }
}
