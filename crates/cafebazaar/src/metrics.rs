//! Metric emission for billing calls and token refreshes
//!
//! - `bazaar_requests_total` (counter): labels `route`, `outcome`
//! - `bazaar_token_refresh_total` (counter): label `outcome`
//!
//! `outcome` is `ok` or an `Error::label()`. These are no-ops until the
//! embedding application installs a recorder.

use crate::endpoint::Route;

/// Record a completed billing call.
pub fn record_request(route: Route, outcome: &'static str) {
    metrics::counter!("bazaar_requests_total", "route" => route.name(), "outcome" => outcome)
        .increment(1);
}

/// Record a refresh-token exchange.
pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("bazaar_token_refresh_total", "outcome" => outcome).increment(1);
}
