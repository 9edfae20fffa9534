//! Application identity: client-credentials authentication.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::api::{ClientCredentialsRequest, HttpClient, OAuthToken, TOKEN};
use crate::config::Config;
use crate::types::ServiceUrl;

use super::credentials::Credentials;
use super::session::{Session, SessionInfo, SessionKind, reject_credentials};
use super::tokens::TokenSet;

/// A session authenticated with an application's client id and secret.
///
/// There is no refresh token: renewal repeats the client-credentials grant.
#[derive(Debug, Clone)]
pub struct ApplicationSession {
    credentials: Credentials,
    auth_url: ServiceUrl,
    http: HttpClient,
}

impl ApplicationSession {
    /// Create an application session.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        config: &Config,
    ) -> Self {
        Self {
            credentials: Credentials::application(client_id, client_secret),
            auth_url: config.auth_url().clone(),
            http: HttpClient::new(config.timeout()),
        }
    }

    fn client_secret(&self) -> &str {
        self.credentials.client_secret().unwrap_or_default()
    }

    async fn authenticate(&self) -> Result<TokenSet> {
        let request = ClientCredentialsRequest::new(self.credentials.client_id(), self.client_secret());
        let response: OAuthToken = self
            .http
            .post(&self.auth_url.endpoint(TOKEN), &request)
            .await
            .map_err(reject_credentials)?;

        Ok(TokenSet::new(response.access_token).expiring_in(response.expires_in))
    }
}

#[async_trait]
impl Session for ApplicationSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Application
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    async fn request_access(&self) -> Result<TokenSet> {
        info!("Authenticating application");
        let tokens = self.authenticate().await?;
        debug!("Application authenticated");
        Ok(tokens)
    }

    #[instrument(skip(self, _current), fields(client_id = %self.credentials.client_id()))]
    async fn refresh(&self, _current: &TokenSet) -> Result<TokenSet> {
        info!("Re-authenticating application");
        let tokens = self.authenticate().await?;
        debug!("Application token renewed");
        Ok(tokens)
    }

    fn session_info(&self, tokens: Option<&TokenSet>) -> SessionInfo {
        let access_token = tokens
            .map(|t| t.access_token().as_str().to_string())
            .unwrap_or_default();

        SessionInfo::from([
            ("access_token", access_token),
            ("client_id", self.credentials.client_id().to_string()),
            ("client_secret", self.client_secret().to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_info_never_has_device_fields() {
        let session = ApplicationSession::new("abc", "s3cret", &Config::default());
        let info = session.session_info(Some(&TokenSet::new("t1")));
        assert_eq!(info["access_token"], "t1");
        assert_eq!(info["client_id"], "abc");
        assert_eq!(info["client_secret"], "s3cret");
        assert!(!info.contains_key("device_id"));
        assert!(!info.contains_key("refresh_token"));
    }

    #[test]
    fn debug_hides_secret() {
        let session = ApplicationSession::new("abc", "s3cret", &Config::default());
        assert!(!format!("{:?}", session).contains("s3cret"));
    }
}
