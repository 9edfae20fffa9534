//! HTTP transport for the remote services.
//!
//! The OAuth endpoints and the Geotrigger API both take JSON bodies over
//! POST and report failures through an `error` member in the response.

mod client;
mod endpoints;

pub(crate) use client::HttpClient;
pub(crate) use endpoints::*;
