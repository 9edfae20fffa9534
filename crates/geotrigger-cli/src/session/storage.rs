//! Session storage for persisting login state.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use geotrigger::{Client, Config, Credentials, SessionKind, TokenSet};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Stored session data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub kind: SessionKind,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredSession {
    /// Capture the client's credentials and current tokens.
    ///
    /// Returns `None` if the client has not acquired tokens yet.
    pub fn capture(client: &Client) -> Option<Self> {
        let tokens = client.tokens()?;
        let credentials = client.credentials();

        Some(Self {
            kind: client.kind(),
            client_id: credentials.client_id().to_string(),
            client_secret: credentials.client_secret().map(str::to_string),
            access_token: tokens.access_token().as_str().to_string(),
            refresh_token: tokens.refresh_token().map(|t| t.as_str().to_string()),
            device_id: tokens.device_id().map(str::to_string),
            expires_at: tokens.expires_at(),
        })
    }

    /// Rebuild a client from the stored tokens, without a network exchange.
    pub fn restore(&self, config: &Config) -> Result<Client> {
        let credentials = match self.kind {
            SessionKind::Device => Credentials::device(&self.client_id),
            SessionKind::Application => {
                let secret = self
                    .client_secret
                    .as_deref()
                    .context("Stored application session has no client secret")?;
                Credentials::application(&self.client_id, secret)
            }
        };

        let mut tokens = TokenSet::new(&self.access_token).with_expires_at(self.expires_at);
        if let Some(ref refresh_token) = self.refresh_token {
            tokens = tokens.with_refresh_token(refresh_token);
        }
        if let Some(ref device_id) = self.device_id {
            tokens = tokens.with_device_id(device_id);
        }

        Ok(Client::restore(credentials, tokens, config))
    }
}

/// Get the session file path.
fn session_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "geotrigger").context("Could not determine data directory")?;

    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data directory")?;

    Ok(data_dir.join("session.json"))
}

/// Save a session to disk.
pub fn save_session(session: &StoredSession) -> Result<()> {
    let path = session_path()?;
    let json = serde_json::to_string_pretty(session)?;

    fs::write(&path, &json).context("Failed to write session file")?;

    // Set restrictive permissions (Unix only)
    #[cfg(unix)]
    {
        let mut perms = fs::metadata(&path)?.permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    tracing::debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load a session from disk.
pub fn load_session() -> Result<Option<StoredSession>> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(None);
    }

    let json = fs::read_to_string(&path).context("Failed to read session file")?;
    let stored = serde_json::from_str(&json).context("Invalid session file")?;

    Ok(Some(stored))
}

/// Load a session, failing if none is stored.
pub fn require_session() -> Result<StoredSession> {
    load_session()
        .context("Failed to load session")?
        .context("No active session. Run 'geotrigger register-device' or 'geotrigger login-application' first.")
}

/// Clear the stored session.
///
/// Returns whether a session file was removed.
pub fn clear_session() -> Result<bool> {
    let path = session_path()?;

    if !path.exists() {
        return Ok(false);
    }

    fs::remove_file(&path).context("Failed to remove session file")?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_session_omits_secret() {
        let stored = StoredSession {
            kind: SessionKind::Device,
            client_id: "abc".to_string(),
            client_secret: None,
            access_token: "t1".to_string(),
            refresh_token: Some("r1".to_string()),
            device_id: Some("d1".to_string()),
            expires_at: None,
        };

        let json = serde_json::to_value(&stored).unwrap();
        assert_eq!(json["kind"], "device");
        assert!(json.get("client_secret").is_none());
        assert!(json.get("expires_at").is_none());

        let parsed: StoredSession = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, stored);
    }

    #[tokio::test]
    async fn application_session_without_secret_is_rejected() {
        let stored = StoredSession {
            kind: SessionKind::Application,
            client_id: "app".to_string(),
            client_secret: None,
            access_token: "a1".to_string(),
            refresh_token: None,
            device_id: None,
            expires_at: None,
        };

        assert!(stored.restore(&Config::default()).is_err());
    }

    #[tokio::test]
    async fn capture_after_restore_keeps_fields() {
        let stored = StoredSession {
            kind: SessionKind::Device,
            client_id: "abc".to_string(),
            client_secret: None,
            access_token: "t1".to_string(),
            refresh_token: Some("r1".to_string()),
            device_id: Some("d1".to_string()),
            expires_at: Some(Utc::now()),
        };

        let client = stored.restore(&Config::default()).unwrap();
        assert_eq!(StoredSession::capture(&client), Some(stored));
    }
}
