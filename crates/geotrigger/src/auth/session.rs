//! The identity-mode contract shared by device and application sessions.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::{AuthError, Error};

use super::credentials::Credentials;
use super::tokens::TokenSet;

/// A read-only snapshot of the token-related fields of a session.
///
/// Device sessions carry `access_token`, `refresh_token`, `device_id` and
/// `client_id`; application sessions carry `access_token`, `client_id` and
/// `client_secret`.
pub type SessionInfo = BTreeMap<&'static str, String>;

/// The identity mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// An anonymous device holding a refresh token.
    Device,
    /// An application re-authenticating with its client secret.
    Application,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Device => f.write_str("device"),
            SessionKind::Application => f.write_str("application"),
        }
    }
}

/// How a session acquires and renews its tokens.
///
/// Implementations perform the network exchanges but hold no token state:
/// the token manager owns the current [`TokenSet`] and is the only caller of
/// [`request_access`](Session::request_access) and [`refresh`](Session::refresh),
/// one call at a time.
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// Returns the identity mode.
    fn kind(&self) -> SessionKind;

    /// Returns the credentials this session authenticates with.
    fn credentials(&self) -> &Credentials;

    /// Perform the initial credential exchange.
    async fn request_access(&self) -> Result<TokenSet>;

    /// Obtain a replacement for `current`.
    async fn refresh(&self, current: &TokenSet) -> Result<TokenSet>;

    /// Render the session fields, using empty strings for unknown values.
    fn session_info(&self, tokens: Option<&TokenSet>) -> SessionInfo;
}

/// Maps an OAuth error body to a credential rejection.
///
/// Server-side failures (5xx) stay API errors since retrying them later may
/// succeed with the same credentials.
pub(crate) fn reject_credentials(err: Error) -> Error {
    match err {
        Error::Api(api) if api.status < 500 => AuthError::CredentialsRejected {
            message: api.to_string(),
        }
        .into(),
        other => other,
    }
}
