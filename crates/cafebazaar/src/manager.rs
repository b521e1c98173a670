//! Access token lifecycle
//!
//! `TokenManager` owns the client's credentials behind a tokio Mutex. The
//! lock is held for the whole refresh exchange, so refreshes are serialized
//! and a caller that waited on the lock re-checks the expiry before paying
//! for another exchange. Readers take a cloned snapshot of the access token
//! under the same lock; a request may still carry a token that is replaced
//! a moment later, which the upstream answers with the expired-token
//! sentinel.

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::constants::EXPIRY_SAFETY_MARGIN_SECS;
use crate::credentials::{Credentials, TokenState, unix_now};
use crate::error::Result;
use crate::metrics;
use crate::token::exchange_refresh_token;

pub struct TokenManager {
    http: reqwest::Client,
    auth_url: String,
    credentials: Mutex<Credentials>,
}

impl TokenManager {
    pub fn new(http: reqwest::Client, auth_url: String, credentials: Credentials) -> Self {
        Self {
            http,
            auth_url,
            credentials: Mutex::new(credentials),
        }
    }

    /// Snapshot of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.lock().await.clone()
    }

    /// Snapshot of the current access token (empty before the first refresh).
    pub async fn access_token(&self) -> String {
        self.credentials.lock().await.access_token.expose().clone()
    }

    pub async fn state(&self) -> TokenState {
        self.credentials.lock().await.state(unix_now())
    }

    /// Refresh the access token if it is missing or expired; otherwise no-op.
    ///
    /// The expiry check runs after the lock is acquired, so callers that
    /// queued behind an in-flight refresh see the new token and return
    /// without a second exchange.
    pub async fn ensure_fresh_token(&self) -> Result<()> {
        let mut credentials = self.credentials.lock().await;
        let now = unix_now();
        if !credentials.needs_refresh(now) {
            debug!(expires_at = credentials.expires_at, "access token still valid");
            return Ok(());
        }
        self.refresh_locked(&mut credentials).await
    }

    /// Unconditionally exchange the refresh token for a new access token.
    pub async fn refresh_token(&self) -> Result<()> {
        let mut credentials = self.credentials.lock().await;
        self.refresh_locked(&mut credentials).await
    }

    /// Credentials are only written once the exchange has fully succeeded.
    async fn refresh_locked(&self, credentials: &mut Credentials) -> Result<()> {
        debug!(
            client_id = %credentials.client_id,
            state = ?credentials.state(unix_now()),
            "refreshing access token"
        );

        let token = match exchange_refresh_token(&self.http, &self.auth_url, credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!(client_id = %credentials.client_id, error = %e, "access token refresh failed");
                metrics::record_refresh(e.label());
                return Err(e);
            }
        };

        let issued_at = unix_now();
        credentials.access_token = token.access_token.into();
        credentials.expires_at = issued_at
            .saturating_add(token.expires_in)
            .saturating_sub(EXPIRY_SAFETY_MARGIN_SECS);

        metrics::record_refresh("ok");
        info!(
            client_id = %credentials.client_id,
            expires_at = credentials.expires_at,
            "access token refreshed"
        );
        Ok(())
    }
}
