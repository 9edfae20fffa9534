//! The public client façade.

use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::api::HttpClient;
use crate::auth::manager::{self, TokenManagerHandle};
use crate::auth::{
    ApplicationSession, Credentials, DeviceSession, Session, SessionInfo, SessionKind, TokenSet,
    TokenStore,
};
use crate::completion::Completion;
use crate::config::Config;
use crate::error::{AuthError, Error, InvalidInputError};
use crate::types::ServiceUrl;

/// A client for the Geotrigger API.
///
/// The client owns a session and a background token manager. Requests are
/// made with [`Client::request`]; tokens are acquired, attached, and renewed
/// transparently. When the API rejects a token, the request triggers one
/// refresh (shared with every other request that hit the same rejection)
/// and is retried once.
///
/// Clients are cheap to clone and safe to share across tasks. They must be
/// created inside a Tokio runtime.
///
/// # Example
///
/// ```no_run
/// use geotrigger::{Client, Config};
/// use serde_json::{Value, json};
///
/// # async fn example() -> Result<(), geotrigger::Error> {
/// let (client, ready) = Client::new_device("my-client-id", &Config::default());
/// ready.await?;
///
/// let triggers: Value = client.request("trigger/list", &json!({"tags": ["demo"]})).await?;
/// println!("{triggers}");
/// println!("device id: {}", client.session_info()["device_id"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    session: Arc<dyn Session>,
    api_url: ServiceUrl,
    http: HttpClient,
    manager: TokenManagerHandle,
    store: TokenStore,
}

impl Client {
    /// Register a new device under `client_id`.
    ///
    /// The returned completion resolves once registration has finished.
    /// Requests issued before that wait for it.
    pub fn new_device(client_id: impl Into<String>, config: &Config) -> (Self, Completion<()>) {
        Self::from_session(Arc::new(DeviceSession::new(client_id, config)), None, config)
    }

    /// Authenticate as the application identified by `client_id` and `client_secret`.
    ///
    /// The returned completion resolves once authentication has finished.
    pub fn new_application(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        config: &Config,
    ) -> (Self, Completion<()>) {
        let session = ApplicationSession::new(client_id, client_secret, config);
        Self::from_session(Arc::new(session), None, config)
    }

    /// Resume a session from previously issued tokens, without a network exchange.
    ///
    /// The identity mode follows `credentials`: application credentials carry a
    /// secret, device credentials do not. The caller is responsible for the
    /// tokens belonging to these credentials; rejected tokens are renewed as usual.
    pub fn restore(credentials: Credentials, tokens: TokenSet, config: &Config) -> Self {
        let session: Arc<dyn Session> = match credentials.client_secret() {
            Some(secret) => Arc::new(ApplicationSession::new(
                credentials.client_id(),
                secret,
                config,
            )),
            None => Arc::new(DeviceSession::new(credentials.client_id(), config)),
        };

        let (client, _ready) = Self::from_session(session, Some(tokens), config);
        client
    }

    /// Build a client around any [`Session`] implementation.
    ///
    /// With `tokens` the client starts authenticated and the completion is
    /// already resolved; without, the session's initial exchange runs first.
    pub fn from_session(
        session: Arc<dyn Session>,
        tokens: Option<TokenSet>,
        config: &Config,
    ) -> (Self, Completion<()>) {
        debug!(kind = %session.kind(), restored = tokens.is_some(), "Creating client");

        let (manager, store, ready) = manager::spawn(Arc::clone(&session), tokens);
        let client = Self {
            inner: Arc::new(ClientInner {
                session,
                api_url: config.api_url().clone(),
                http: HttpClient::new(config.timeout()),
                manager,
                store,
            }),
        };

        (client, ready)
    }

    /// Make an API request and decode the response into `T`.
    ///
    /// `route` is relative to the API base URL (e.g. `"trigger/list"`) and
    /// `params` is sent as the JSON body. `T` can be a struct modeling the
    /// response or [`serde_json::Value`].
    ///
    /// # Errors
    ///
    /// Transport, API and decoding errors are returned as they occur. A
    /// rejected token is refreshed and the request retried once; a second
    /// rejection returns [`AuthError::TokenRejected`].
    #[instrument(skip(self, params), fields(kind = %self.inner.session.kind()))]
    pub async fn request<T, P>(&self, route: &str, params: &P) -> Result<T>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.endpoint(route)?;
        let tokens = self.inner.manager.access().await?;

        match self
            .inner
            .http
            .post_authed(&url, params, tokens.access_token())
            .await
        {
            Err(err) if err.is_auth_failure() => {
                info!(error = %err, "Access token rejected; refreshing");
                let fresh = self
                    .inner
                    .manager
                    .refresh(tokens.access_token().clone())
                    .await?;

                self.inner
                    .http
                    .post_authed(&url, params, fresh.access_token())
                    .await
                    .map_err(|err| {
                        if err.is_auth_failure() {
                            warn!(error = %err, "Refreshed token rejected");
                            Error::from(AuthError::TokenRejected)
                        } else {
                            err
                        }
                    })
            }
            other => other,
        }
    }

    /// Run [`Client::request`] on a background task.
    ///
    /// The returned completion resolves exactly once with the request's result.
    pub fn spawn_request<T, P>(&self, route: impl Into<String>, params: P) -> Completion<T>
    where
        T: DeserializeOwned + Send + 'static,
        P: Serialize + Send + Sync + 'static,
    {
        let (tx, completion) = Completion::channel();
        let client = self.clone();
        let route = route.into();

        tokio::spawn(async move {
            let result = client.request(&route, &params).await;
            let _ = tx.send(result);
        });

        completion
    }

    /// A snapshot of the session's token-related fields.
    ///
    /// Device sessions report `access_token`, `refresh_token`, `device_id` and
    /// `client_id`; application sessions report `access_token`, `client_id`
    /// and `client_secret`.
    pub fn session_info(&self) -> SessionInfo {
        let tokens = self.inner.store.snapshot();
        self.inner.session.session_info(tokens.as_ref())
    }

    /// The current token set, if one has been acquired.
    pub fn tokens(&self) -> Option<TokenSet> {
        self.inner.store.snapshot()
    }

    /// A reader that can wait for token replacements.
    pub fn token_store(&self) -> TokenStore {
        self.inner.store.clone()
    }

    /// The session's identity mode.
    pub fn kind(&self) -> SessionKind {
        self.inner.session.kind()
    }

    /// The credentials the session authenticates with.
    pub fn credentials(&self) -> &Credentials {
        self.inner.session.credentials()
    }

    fn endpoint(&self, route: &str) -> Result<String> {
        let trimmed = route.trim_matches('/');
        if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
            return Err(InvalidInputError::Route {
                value: route.to_string(),
                reason: "must be a non-empty path without whitespace".to_string(),
            }
            .into());
        }
        Ok(self.inner.api_url.endpoint(trimmed))
    }
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("kind", &self.inner.session.kind())
            .field("client_id", &self.inner.session.credentials().client_id())
            .field("api_url", &self.inner.api_url)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_empty_route() {
        let client = Client::restore(
            Credentials::device("abc"),
            TokenSet::new("t1").with_device_id("d1"),
            &Config::default(),
        );
        let result: Result<serde_json::Value> = client.request("/", &serde_json::json!({})).await;
        assert!(matches!(result, Err(crate::Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn restore_picks_identity_from_credentials() {
        let config = Config::default();
        let device = Client::restore(Credentials::device("abc"), TokenSet::new("t1"), &config);
        let app = Client::restore(
            Credentials::application("abc", "s3cret"),
            TokenSet::new("t2"),
            &config,
        );

        assert_eq!(device.kind(), SessionKind::Device);
        assert_eq!(app.kind(), SessionKind::Application);
        assert_eq!(app.session_info()["access_token"], "t2");
        assert_eq!(app.session_info()["client_secret"], "s3cret");
    }

    #[tokio::test]
    async fn debug_hides_tokens_and_secret() {
        let client = Client::restore(
            Credentials::application("abc", "s3cret"),
            TokenSet::new("t-secret-token"),
            &Config::default(),
        );
        let debug = format!("{:?}", client);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("t-secret-token"));
    }
}
