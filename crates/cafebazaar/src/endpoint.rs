//! Endpoint builder for the four developer API routes
//!
//! Each route has a path template. Template segments starting with `:` are
//! filled from the endpoint options of the same name; options that no
//! segment consumes go to the query string, in the order they were set,
//! followed by the access token. Nothing checks that every placeholder was
//! supplied: a missing option renders as an empty segment and the upstream
//! answers the resulting URL however it answers a bad request.

use std::fmt;

use common::Secret;
use reqwest::Url;

use crate::constants::{ACCESS_TOKEN_PARAM, DEFAULT_BASE_URL};

/// Named upstream operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Auth,
    ValidatePurchase,
    GetSubscriptionStatus,
    CancelSubscription,
}

impl Route {
    /// Wire name of the route, also used as the `route` log/metric field.
    pub fn name(self) -> &'static str {
        match self {
            Route::Auth => "auth",
            Route::ValidatePurchase => "validatePurchase",
            Route::GetSubscriptionStatus => "getSubscriptionStatus",
            Route::CancelSubscription => "cancelSubscription",
        }
    }

    fn template(self) -> &'static [&'static str] {
        match self {
            Route::Auth => &["auth", "token", ""],
            Route::ValidatePurchase => &[
                "api",
                "validate",
                ":packageName",
                "inapp",
                ":productId",
                "purchases",
                ":purchaseToken",
                "",
            ],
            Route::GetSubscriptionStatus => &[
                "api",
                "applications",
                ":packageName",
                "subscriptions",
                ":subscriptionId",
                "purchases",
                ":purchaseToken",
                "",
            ],
            Route::CancelSubscription => &[
                "api",
                "applications",
                ":packageName",
                "subscriptions",
                ":subscriptionId",
                "purchases",
                ":purchaseToken",
                "cancel",
                "",
            ],
        }
    }

    /// Whether the path template has a placeholder for `key`.
    fn binds(self, key: &str) -> bool {
        self.template()
            .iter()
            .any(|part| part.strip_prefix(':') == Some(key))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A route plus the options and token for one call. Built fresh per call.
#[derive(Debug, Clone)]
pub struct Endpoint {
    base_url: Url,
    route: Route,
    options: Vec<(String, String)>,
    access_token: Option<Secret<String>>,
}

impl Endpoint {
    /// Endpoint against the production API.
    pub fn new(route: Route) -> Self {
        let base_url = Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL");
        Self::with_base_url(&base_url, route)
    }

    /// Endpoint against an alternative API root (staging, local mock).
    pub fn with_base_url(base_url: &Url, route: Route) -> Self {
        Self {
            base_url: base_url.clone(),
            route,
            options: Vec::new(),
            access_token: None,
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    /// Attach an option. Repeated calls accumulate in order.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.options.push((key.into(), value.into()));
        self
    }

    /// Attach the bearer token as the `access_token` query parameter.
    pub fn set_access_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.access_token = Some(Secret::new(token.into()));
        self
    }

    fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render the full request URL.
    pub fn generate(&self) -> String {
        let mut url = self.base_url.clone();

        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            for part in self.route.template() {
                match part.strip_prefix(':') {
                    Some(name) => segments.push(self.option(name).unwrap_or_default()),
                    None => segments.push(part),
                };
            }
        }

        let query: Vec<(&str, &str)> = self
            .options
            .iter()
            .filter(|(k, _)| !self.route.binds(k))
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .chain(
                self.access_token
                    .iter()
                    .map(|token| (ACCESS_TOKEN_PARAM, token.expose().as_str())),
            )
            .collect();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        url.to_string()
    }
}
