//! geotrigger - Geotrigger API client with managed sessions
//!
//! This library talks to the Geotrigger geofencing service as either an
//! anonymous device or an application. All requests flow through a
//! [`Client`], which acquires tokens, attaches them, and renews them when the
//! API rejects them. Concurrent requests that hit an expired token share a
//! single refresh.
//!
//! # Example
//!
//! ```no_run
//! use geotrigger::{Client, Config};
//! use serde_json::{Value, json};
//!
//! # async fn example() -> Result<(), geotrigger::Error> {
//! let config = Config::default();
//! let (client, ready) = Client::new_application("client-id", "client-secret", &config);
//! ready.await?;
//!
//! let response: Value = client
//!     .request("trigger/create", &json!({
//!         "condition": {"direction": "enter", "geo": {"latitude": 45.5, "longitude": -122.6, "distance": 100}},
//!         "action": {"message": "Welcome"}
//!     }))
//!     .await?;
//! println!("{response}");
//! # Ok(())
//! # }
//! ```

mod api;
pub mod auth;
mod client;
mod completion;
pub mod config;
pub mod error;
pub mod types;

// Re-export primary types at crate root for convenience
pub use auth::{
    AccessToken, ApplicationSession, Credentials, DeviceSession, RefreshToken, Session,
    SessionInfo, SessionKind, TokenSet, TokenStore,
};
pub use client::Client;
pub use completion::Completion;
pub use config::Config;
pub use error::Error;
pub use types::ServiceUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
