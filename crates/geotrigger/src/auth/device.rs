//! Device identity: anonymous registration plus refresh-token renewal.

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::Result;
use crate::api::{
    HttpClient, OAuthToken, REGISTER_DEVICE, RefreshTokenRequest, RegisterDeviceRequest,
    RegisterDeviceResponse, TOKEN,
};
use crate::config::Config;
use crate::error::AuthError;
use crate::types::ServiceUrl;

use super::credentials::Credentials;
use super::session::{Session, SessionInfo, SessionKind, reject_credentials};
use super::tokens::TokenSet;

/// A session that registers itself as an anonymous device.
///
/// The first exchange yields a device id, an access token and a refresh
/// token; renewals trade the refresh token for a new access token.
#[derive(Debug, Clone)]
pub struct DeviceSession {
    credentials: Credentials,
    auth_url: ServiceUrl,
    http: HttpClient,
}

impl DeviceSession {
    /// Create a device session for the application identified by `client_id`.
    pub fn new(client_id: impl Into<String>, config: &Config) -> Self {
        Self {
            credentials: Credentials::device(client_id),
            auth_url: config.auth_url().clone(),
            http: HttpClient::new(config.timeout()),
        }
    }
}

#[async_trait]
impl Session for DeviceSession {
    fn kind(&self) -> SessionKind {
        SessionKind::Device
    }

    fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    async fn request_access(&self) -> Result<TokenSet> {
        info!("Registering device");

        let request = RegisterDeviceRequest::new(self.credentials.client_id());
        let response: RegisterDeviceResponse = self
            .http
            .post(&self.auth_url.endpoint(REGISTER_DEVICE), &request)
            .await
            .map_err(reject_credentials)?;

        let token = response.device_token;
        let mut tokens = TokenSet::new(token.access_token)
            .with_device_id(response.device.device_id)
            .expiring_in(token.expires_in);
        if let Some(refresh_token) = token.refresh_token {
            tokens = tokens.with_refresh_token(refresh_token);
        }

        debug!(device_id = ?tokens.device_id(), "Device registered");
        Ok(tokens)
    }

    #[instrument(skip(self, current), fields(client_id = %self.credentials.client_id()))]
    async fn refresh(&self, current: &TokenSet) -> Result<TokenSet> {
        info!("Refreshing device token");

        let refresh_token = current
            .refresh_token()
            .ok_or(AuthError::MissingRefreshToken)?;

        let request = RefreshTokenRequest::new(self.credentials.client_id(), refresh_token.as_str());
        let response: OAuthToken = self
            .http
            .post(&self.auth_url.endpoint(TOKEN), &request)
            .await
            .map_err(reject_credentials)?;

        let next_refresh = response
            .refresh_token
            .unwrap_or_else(|| refresh_token.as_str().to_string());
        let mut tokens = TokenSet::new(response.access_token)
            .with_refresh_token(next_refresh)
            .expiring_in(response.expires_in);
        if let Some(device_id) = current.device_id() {
            tokens = tokens.with_device_id(device_id);
        }

        debug!("Device token refreshed");
        Ok(tokens)
    }

    fn session_info(&self, tokens: Option<&TokenSet>) -> SessionInfo {
        let field = |get: fn(&TokenSet) -> Option<&str>| {
            tokens.and_then(get).unwrap_or_default().to_string()
        };

        SessionInfo::from([
            ("access_token", field(|t| Some(t.access_token().as_str()))),
            ("refresh_token", field(|t| t.refresh_token().map(|r| r.as_str()))),
            ("device_id", field(TokenSet::device_id)),
            ("client_id", self.credentials.client_id().to_string()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_info_before_registration_has_all_keys() {
        let session = DeviceSession::new("abc", &Config::default());
        let info = session.session_info(None);
        assert_eq!(info["access_token"], "");
        assert_eq!(info["refresh_token"], "");
        assert_eq!(info["device_id"], "");
        assert_eq!(info["client_id"], "abc");
        assert!(!info.contains_key("client_secret"));
    }

    #[test]
    fn session_info_reflects_tokens() {
        let session = DeviceSession::new("abc", &Config::default());
        let tokens = TokenSet::new("t1")
            .with_refresh_token("r1")
            .with_device_id("d1");
        let info = session.session_info(Some(&tokens));
        assert_eq!(info["access_token"], "t1");
        assert_eq!(info["refresh_token"], "r1");
        assert_eq!(info["device_id"], "d1");
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_without_network() {
        let session = DeviceSession::new("abc", &Config::default());
        let err = session.refresh(&TokenSet::new("t1")).await.unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Auth(AuthError::MissingRefreshToken)
        ));
    }
}
