//! Billing client: construction and the three billing operations
//!
//! Every operation first makes sure the access token is fresh, then issues
//! a single GET. There is no retry: an `AccessTokenExpired` answer is
//! returned as-is and the caller decides whether to call again.

use std::path::Path;

use reqwest::Url;
use serde::de::IgnoredAny;
use tracing::{debug, info};

use crate::constants::DEFAULT_BASE_URL;
use crate::credentials::{Credentials, TokenState};
use crate::endpoint::{Endpoint, Route};
use crate::error::{Error, Result};
use crate::manager::TokenManager;
use crate::models::{Purchase, Subscription};
use crate::response::request_to;

/// Configures a [`Client`] before it is built.
#[derive(Debug, Default)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    base_url: Option<String>,
}

impl ClientBuilder {
    /// Use a preconfigured HTTP client (timeouts, proxies, TLS settings).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Point the client at another API root. Defaults to production.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build a client around existing credentials without contacting the API.
    pub fn with_credentials(self, credentials: Credentials) -> Result<Client> {
        let raw = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(raw)
            .map_err(|e| Error::CannotInitiateRequest(format!("invalid base URL {raw}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::CannotInitiateRequest(format!(
                "base URL {raw} cannot carry a path"
            )));
        }

        let http = self.http.unwrap_or_default();
        let auth_url = Endpoint::with_base_url(&base_url, Route::Auth).generate();
        Ok(Client {
            tokens: TokenManager::new(http.clone(), auth_url, credentials),
            http,
            base_url,
        })
    }

    /// Build a client and obtain its first access token.
    pub async fn connect(
        self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Client> {
        let client =
            self.with_credentials(Credentials::new(client_id, client_secret, refresh_token))?;
        client.refresh_token().await?;
        Ok(client)
    }

    /// Build a client from a JSON credential file.
    ///
    /// A still-valid stored token is used as-is. Otherwise the token is
    /// refreshed and the file is rewritten in full with the new token.
    pub async fn from_file(self, path: impl AsRef<Path>) -> Result<Client> {
        let path = path.as_ref();
        let credentials = Credentials::load(path).await?;
        let client = self.with_credentials(credentials)?;

        if client.token_state().await == TokenState::Authenticated {
            debug!(path = %path.display(), "stored access token still valid");
            return Ok(client);
        }

        client.refresh_token().await?;
        client.save_credentials(path).await?;
        info!(path = %path.display(), "refreshed stored credentials");
        Ok(client)
    }
}

/// Authenticated client for the Cafe Bazaar developer API.
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenManager,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client against production, with an initial token refresh.
    pub async fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .connect(client_id, client_secret, refresh_token)
            .await
    }

    /// Client against production, loaded from a credential file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().from_file(path).await
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Snapshot of the current credentials, e.g. for persisting.
    pub async fn credentials(&self) -> Credentials {
        self.tokens.credentials().await
    }

    pub async fn token_state(&self) -> TokenState {
        self.tokens.state().await
    }

    /// Write the current credentials to a JSON credential file.
    pub async fn save_credentials(&self, path: impl AsRef<Path>) -> Result<()> {
        self.credentials().await.save(path).await?;
        Ok(())
    }

    /// Refresh the access token only if it is missing or expired.
    pub async fn ensure_fresh_token(&self) -> Result<()> {
        self.tokens.ensure_fresh_token().await
    }

    /// Exchange the refresh token for a new access token now.
    pub async fn refresh_token(&self) -> Result<()> {
        self.tokens.refresh_token().await
    }

    /// Validate an in-app purchase.
    pub async fn purchase_validate(
        &self,
        package_name: &str,
        product_id: &str,
        purchase_token: &str,
    ) -> Result<Purchase> {
        let endpoint = self
            .authorized_endpoint(
                Route::ValidatePurchase,
                [
                    ("packageName", package_name),
                    ("productId", product_id),
                    ("purchaseToken", purchase_token),
                ],
            )
            .await?;
        request_to(&self.http, &endpoint)
            .await?
            .ok_or(Error::CannotFindResource)
    }

    /// Look up the status of a subscription.
    pub async fn subscription_get(
        &self,
        package_name: &str,
        subscription_id: &str,
        purchase_token: &str,
    ) -> Result<Subscription> {
        let endpoint = self
            .authorized_endpoint(
                Route::GetSubscriptionStatus,
                [
                    ("packageName", package_name),
                    ("subscriptionId", subscription_id),
                    ("purchaseToken", purchase_token),
                ],
            )
            .await?;
        request_to(&self.http, &endpoint)
            .await?
            .ok_or(Error::CannotFindResource)
    }

    /// Cancel a subscription's auto-renewal.
    pub async fn subscription_cancel(
        &self,
        package_name: &str,
        subscription_id: &str,
        purchase_token: &str,
    ) -> Result<()> {
        let endpoint = self
            .authorized_endpoint(
                Route::CancelSubscription,
                [
                    ("packageName", package_name),
                    ("subscriptionId", subscription_id),
                    ("purchaseToken", purchase_token),
                ],
            )
            .await?;
        request_to::<IgnoredAny>(&self.http, &endpoint).await?;
        Ok(())
    }

    async fn authorized_endpoint(
        &self,
        route: Route,
        options: [(&str, &str); 3],
    ) -> Result<Endpoint> {
        self.tokens.ensure_fresh_token().await?;

        let mut endpoint = Endpoint::with_base_url(&self.base_url, route);
        for (key, value) in options {
            endpoint.set_option(key, value);
        }
        endpoint.set_access_token(self.tokens.access_token().await);
        Ok(endpoint)
    }
}
