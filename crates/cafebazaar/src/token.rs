//! Refresh-token exchange against the auth endpoint
//!
//! Posts a form-encoded `refresh_token` grant and decodes the token
//! response. Only `access_token` and `expires_in` are consumed; the API
//! keeps the refresh token stable across exchanges.

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

use crate::constants::REFRESH_GRANT_TYPE;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::form::Form;

/// Response from the auth endpoint.
///
/// `expires_in` is a delta in seconds from the response time. The caller
/// converts this to an absolute unix timestamp when storing the credential.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: i64,
    pub scope: String,
    pub refresh_token: String,
}

/// Build the refresh grant form for a set of credentials.
pub fn refresh_form(credentials: &Credentials) -> Form {
    let mut form = Form::new();
    form.insert("grant_type", REFRESH_GRANT_TYPE)
        .insert("client_id", credentials.client_id.as_str())
        .insert("client_secret", credentials.client_secret.expose().as_str())
        .insert("refresh_token", credentials.refresh_token.expose().as_str());
    form
}

/// Exchange a refresh token for a new access token.
///
/// Anything other than HTTP 200 means the client id, secret or refresh token
/// was rejected. A 200 whose body carries no access token is reported
/// separately, since the credentials were accepted.
pub async fn exchange_refresh_token(
    client: &reqwest::Client,
    auth_url: &str,
    credentials: &Credentials,
) -> Result<TokenResponse> {
    let (body, content_type) = refresh_form(credentials).build()?;

    let request = client
        .post(auth_url)
        .header(CONTENT_TYPE, content_type)
        .body(body)
        .build()
        .map_err(|e| Error::CannotInitiateRequest(format!("token refresh request: {e}")))?;

    let response = client
        .execute(request)
        .await
        .map_err(|e| Error::CannotSendRequest(format!("token refresh request failed: {e}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::InvalidCredentials {
            status: status.as_u16(),
            body,
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::CannotGetAccessToken(format!("reading token response: {e}")))?;

    match serde_json::from_slice::<TokenResponse>(&body) {
        Ok(token) if !token.access_token.is_empty() => Ok(token),
        Ok(_) => Err(Error::CannotGetAccessToken(
            "token response has no access_token".into(),
        )),
        Err(e) => Err(Error::CannotGetAccessToken(format!(
            "invalid token response: {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockUpstream;
    use axum::http::StatusCode as MockStatus;

    #[test]
    fn token_response_deserializes() {
        let json = r#"{"access_token":"at_abc","token_type":"Bearer","expires_in":3600,"scope":"androidpublisher","refresh_token":"rt_def"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "at_abc");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.refresh_token, "rt_def");
    }

    #[test]
    fn token_response_tolerates_missing_fields() {
        let token: TokenResponse = serde_json::from_str(r#"{"expires_in":60}"#).unwrap();
        assert!(token.access_token.is_empty());
        assert_eq!(token.expires_in, 60);
    }

    #[test]
    fn refresh_form_has_grant_and_credentials() {
        let form = refresh_form(&Credentials::new("client-1", "secret-1", "rt_1"));
        assert_eq!(form.get("grant_type"), Some("refresh_token"));
        assert_eq!(form.get("client_id"), Some("client-1"));
        assert_eq!(form.get("client_secret"), Some("secret-1"));
        assert_eq!(form.get("refresh_token"), Some("rt_1"));
    }

    #[tokio::test]
    async fn exchange_posts_form_and_decodes_token() {
        let upstream = MockUpstream::builder()
            .auth(
                MockStatus::OK,
                r#"{"access_token":"at_new","token_type":"Bearer","expires_in":3600}"#,
            )
            .start()
            .await;

        let token = exchange_refresh_token(
            &reqwest::Client::new(),
            &upstream.auth_url(),
            &Credentials::new("client-1", "secret-1", "rt_1"),
        )
        .await
        .unwrap();

        assert_eq!(token.access_token, "at_new");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(upstream.auth_hits(), 1);

        let form = upstream.last_auth_body().unwrap();
        assert!(form.contains("grant_type=refresh_token"), "got: {form}");
        assert!(form.contains("client_id=client-1"), "got: {form}");
        assert!(form.contains("client_secret=secret-1"), "got: {form}");
        assert!(form.contains("refresh_token=rt_1"), "got: {form}");
        assert_eq!(
            upstream.last_auth_content_type().as_deref(),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn exchange_rejected_credentials() {
        let upstream = MockUpstream::builder()
            .auth(MockStatus::UNAUTHORIZED, "invalid_client")
            .start()
            .await;

        let err = exchange_refresh_token(
            &reqwest::Client::new(),
            &upstream.auth_url(),
            &Credentials::new("c", "s", "rt_revoked"),
        )
        .await
        .unwrap_err();

        match err {
            Error::InvalidCredentials { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid_client");
            }
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn exchange_without_access_token() {
        let upstream = MockUpstream::builder()
            .auth(MockStatus::OK, r#"{"error":"invalid_grant"}"#)
            .start()
            .await;

        let err = exchange_refresh_token(
            &reqwest::Client::new(),
            &upstream.auth_url(),
            &Credentials::new("c", "s", "r"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CannotGetAccessToken(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn exchange_with_non_json_body() {
        let upstream = MockUpstream::builder()
            .auth(MockStatus::OK, "<html>maintenance</html>")
            .start()
            .await;

        let err = exchange_refresh_token(
            &reqwest::Client::new(),
            &upstream.auth_url(),
            &Credentials::new("c", "s", "r"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CannotGetAccessToken(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn exchange_transport_failure() {
        let url = crate::testing::unreachable_url().await;
        let err = exchange_refresh_token(
            &reqwest::Client::new(),
            &format!("{url}/auth/token/"),
            &Credentials::new("c", "s", "r"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CannotSendRequest(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn exchange_malformed_url() {
        let err = exchange_refresh_token(
            &reqwest::Client::new(),
            "not a url",
            &Credentials::new("c", "s", "r"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CannotInitiateRequest(_)), "got {err:?}");
    }
}
