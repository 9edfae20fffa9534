//! Authentication types, sessions, and token lifecycle management.
//!
//! A [`Session`] knows how to obtain and renew tokens for one identity mode.
//! The token manager owns the current [`TokenSet`] and is the only component
//! that calls into the session; everything else reads snapshots from a
//! [`TokenStore`].

mod application;
mod credentials;
mod device;
pub(crate) mod manager;
mod session;
mod store;
mod tokens;

pub use application::ApplicationSession;
pub use credentials::Credentials;
pub use device::DeviceSession;
pub use session::{Session, SessionInfo, SessionKind};
pub use store::TokenStore;
pub use tokens::{AccessToken, RefreshToken, TokenSet};
