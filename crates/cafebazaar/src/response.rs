//! Billing request execution and response classification
//!
//! The upstream API signals failures through status codes, a plain-text
//! sentinel body, an empty body on cancellation and an empty JSON object
//! for unknown resources. The checks run in a fixed order: status before
//! body, sentinel before the empty-body and empty-object shapes, and those
//! before JSON decoding. Reordering them misclassifies, for example, an
//! empty successful cancellation as a missing resource.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::constants::ACCESS_TOKEN_EXPIRED_BODY;
use crate::endpoint::{Endpoint, Route};
use crate::error::{Error, Result};
use crate::metrics;

/// GET the endpoint and decode the response into `T`.
///
/// Returns `Ok(None)` only for an empty `cancelSubscription` body.
pub async fn request_to<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &Endpoint,
) -> Result<Option<T>> {
    let route = endpoint.route();
    let result = execute(client, endpoint).await;
    match &result {
        Ok(_) => metrics::record_request(route, "ok"),
        Err(e) => metrics::record_request(route, e.label()),
    }
    result
}

async fn execute<T: DeserializeOwned>(
    client: &reqwest::Client,
    endpoint: &Endpoint,
) -> Result<Option<T>> {
    let route = endpoint.route();
    debug!(%route, "sending billing request");

    let response = client
        .get(endpoint.generate())
        .send()
        .await
        .map_err(|e| Error::CannotSendRequest(format!("{route} request failed: {e}")))?;

    let status = response.status();
    debug!(%route, status = status.as_u16(), "billing response received");

    if status == StatusCode::NOT_FOUND {
        return Err(Error::TransactionNotFound);
    }
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::CannotGetData {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::CannotReadBody(format!("{route} response: {e}")))?;

    classify_body(route, &body)
}

/// Interpret a 200 response body for `route`.
pub fn classify_body<T: DeserializeOwned>(route: Route, body: &[u8]) -> Result<Option<T>> {
    if body == ACCESS_TOKEN_EXPIRED_BODY.as_bytes() {
        return Err(Error::AccessTokenExpired);
    }

    if route == Route::CancelSubscription && body.is_empty() {
        return Ok(None);
    }

    if is_empty_object(body) {
        return Err(Error::CannotFindResource);
    }

    // A successful cancellation has no body; anything else is an error payload.
    if route == Route::CancelSubscription {
        return Err(Error::Json(serde::de::Error::custom(format!(
            "unexpected {} byte body on {route}",
            body.len()
        ))));
    }

    Ok(Some(serde_json::from_slice(body)?))
}

/// `{}` with nothing but whitespace inside (and around) it.
fn is_empty_object(body: &[u8]) -> bool {
    let trimmed = body.trim_ascii();
    trimmed.len() >= 2
        && trimmed[0] == b'{'
        && trimmed[trimmed.len() - 1] == b'}'
        && trimmed[1..trimmed.len() - 1]
            .iter()
            .all(u8::is_ascii_whitespace)
}
