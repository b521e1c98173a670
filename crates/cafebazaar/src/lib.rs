//! Cafe Bazaar in-app billing client
//!
//! Authenticated access to purchase validation, subscription lookup and
//! subscription cancellation. The client owns the OAuth client credentials
//! and keeps its access token fresh, so callers never handle token
//! exchanges themselves.
//!
//! Call flow:
//! 1. Caller builds a `Client` via `Client::new()` (initial refresh) or
//!    `Client::from_file()` (credential file, refreshed and rewritten if stale)
//! 2. Each operation calls `TokenManager::ensure_fresh_token()`
//! 3. `Endpoint` renders the route URL with the options and access token
//! 4. `response::request_to()` issues the GET and classifies the response
//! 5. Caller persists rotated tokens with `Client::save_credentials()`

pub mod client;
pub mod constants;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod form;
pub mod manager;
pub mod metrics;
pub mod models;
pub mod response;
pub mod token;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientBuilder};
pub use constants::*;
pub use credentials::{Credentials, TokenState};
pub use endpoint::{Endpoint, Route};
pub use error::{Error, Result};
pub use form::Form;
pub use manager::TokenManager;
pub use models::{Purchase, Subscription};
pub use token::{TokenResponse, exchange_refresh_token};
