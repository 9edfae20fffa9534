//! HTTP client for the OAuth endpoints and the Geotrigger API.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, instrument, trace, warn};

use crate::auth::AccessToken;
use crate::error::{ApiError, Error};

/// Thin JSON-over-POST transport shared by sessions and the client façade.
#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a new client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("geotrigger-rs/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build configured HTTP client; using defaults without timeout");
                reqwest::Client::new()
            });

        Self { client }
    }

    /// POST a JSON body without authentication.
    #[instrument(skip(self, body))]
    pub async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST");

        let response = self.client.post(url).json(body).send().await?;

        self.handle_response(response).await
    }

    /// POST a JSON body with a bearer access token.
    #[instrument(skip(self, body, token))]
    pub async fn post_authed<B, R>(&self, url: &str, body: &B, token: &AccessToken) -> Result<R, Error>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("Authenticated POST");

        let response = self
            .client
            .post(url)
            .bearer_auth(token.as_str())
            .json(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle a response, decoding the body or the error it carries.
    ///
    /// Both services may report errors with HTTP 200, so the body is checked
    /// for an `error` member before decoding.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<R, Error> {
        let status = response.status();
        trace!(status = %status, "response");

        let bytes = response.bytes().await?;
        let value = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => value,
                Err(_) if !status.is_success() => {
                    return Err(ApiError::new(status.as_u16()).into());
                }
                Err(err) => return Err(err.into()),
            }
        };

        if let Some(error) = value.get("error") {
            return Err(ApiError::from_body(status.as_u16(), error).into());
        }

        if !status.is_success() {
            return Err(ApiError::new(status.as_u16()).into());
        }

        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Echo {
        ok: bool,
    }

    async fn mount(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/route"))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn decodes_success_body() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"ok": true})),
        )
        .await;

        let client = HttpClient::new(Duration::from_secs(5));
        let echo: Echo = client
            .post(&format!("{}/route", server.uri()), &json!({}))
            .await
            .unwrap();
        assert!(echo.ok);
    }

    #[tokio::test]
    async fn configured_user_agent_and_timeout_apply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/route"))
            .and(header(
                "User-Agent",
                concat!("geotrigger-rs/", env!("CARGO_PKG_VERSION")),
            ))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_millis(50));
        let err = client
            .post::<_, Echo>(&format!("{}/route", server.uri()), &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transport(crate::error::TransportError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn error_member_with_200_is_api_error() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({"error": {"code": 498, "message": "Invalid token."}})),
        )
        .await;

        let client = HttpClient::new(Duration::from_secs(5));
        let result: Result<Value, Error> = client
            .post(&format!("{}/route", server.uri()), &json!({}))
            .await;
        let err = result.unwrap_err();
        assert!(err.is_auth_failure(), "{err}");
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(200).set_body_string("<html>")).await;

        let client = HttpClient::new(Duration::from_secs(5));
        let result: Result<Value, Error> = client
            .post(&format!("{}/route", server.uri()), &json!({}))
            .await;
        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn wrong_shape_is_malformed() {
        let server = MockServer::start().await;
        mount(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"unexpected": 1})),
        )
        .await;

        let client = HttpClient::new(Duration::from_secs(5));
        let result: Result<Echo, Error> = client
            .post(&format!("{}/route", server.uri()), &json!({}))
            .await;
        assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    }

    #[tokio::test]
    async fn server_error_without_body_is_api_error() {
        let server = MockServer::start().await;
        mount(&server, ResponseTemplate::new(503).set_body_string("down")).await;

        let client = HttpClient::new(Duration::from_secs(5));
        let result: Result<Value, Error> = client
            .post(&format!("{}/route", server.uri()), &json!({}))
            .await;
        match result {
            Err(Error::Api(err)) => assert_eq!(err.status, 503),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/route"))
            .and(header("authorization", "Bearer t1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpClient::new(Duration::from_secs(5));
        let echo: Echo = client
            .post_authed(
                &format!("{}/route", server.uri()),
                &json!({}),
                &AccessToken::new("t1"),
            )
            .await
            .unwrap();
        assert!(echo.ok);
    }

    #[tokio::test]
    async fn unreachable_host_is_transport_error() {
        let client = HttpClient::new(Duration::from_secs(2));
        let result: Result<Value, Error> = client.post("http://127.0.0.1:9/route", &json!({})).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
