//! OAuth endpoint names and request/response types.

use serde::{Deserialize, Serialize};

/// Registers an anonymous device and issues its first token pair.
pub const REGISTER_DEVICE: &str = "registerDevice";

/// Issues tokens for the `client_credentials` and `refresh_token` grants.
pub const TOKEN: &str = "token";

/// Response format requested from the ArcGIS endpoints.
const FORMAT_JSON: &str = "json";

/// Request body for registerDevice.
#[derive(Debug, Serialize)]
pub struct RegisterDeviceRequest<'a> {
    pub client_id: &'a str,
    pub f: &'static str,
}

impl<'a> RegisterDeviceRequest<'a> {
    pub fn new(client_id: &'a str) -> Self {
        Self {
            client_id,
            f: FORMAT_JSON,
        }
    }
}

/// Response from registerDevice.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceResponse {
    pub device: RegisteredDevice,
    pub device_token: OAuthToken,
}

/// The device half of a registerDevice response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredDevice {
    pub device_id: String,
}

/// Token payload shared by every grant.
#[derive(Debug, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Request body for the `client_credentials` grant.
#[derive(Serialize)]
pub struct ClientCredentialsRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub grant_type: &'static str,
    pub f: &'static str,
}

impl<'a> ClientCredentialsRequest<'a> {
    pub fn new(client_id: &'a str, client_secret: &'a str) -> Self {
        Self {
            client_id,
            client_secret,
            grant_type: "client_credentials",
            f: FORMAT_JSON,
        }
    }
}

/// Request body for the `refresh_token` grant.
#[derive(Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub client_id: &'a str,
    pub refresh_token: &'a str,
    pub grant_type: &'static str,
    pub f: &'static str,
}

impl<'a> RefreshTokenRequest<'a> {
    pub fn new(client_id: &'a str, refresh_token: &'a str) -> Self {
        Self {
            client_id,
            refresh_token,
            grant_type: "refresh_token",
            f: FORMAT_JSON,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_device_response_shape() {
        let response: RegisterDeviceResponse = serde_json::from_value(json!({
            "device": {"deviceId": "d1", "client_id": "abc"},
            "deviceToken": {"access_token": "t1", "refresh_token": "r1", "expires_in": 1209600}
        }))
        .unwrap();
        assert_eq!(response.device.device_id, "d1");
        assert_eq!(response.device_token.access_token, "t1");
        assert_eq!(response.device_token.refresh_token.as_deref(), Some("r1"));
        assert_eq!(response.device_token.expires_in, Some(1209600));
    }

    #[test]
    fn refresh_request_body() {
        let body = serde_json::to_value(RefreshTokenRequest::new("abc", "r1")).unwrap();
        assert_eq!(
            body,
            json!({"client_id": "abc", "refresh_token": "r1", "grant_type": "refresh_token", "f": "json"})
        );
    }
}
