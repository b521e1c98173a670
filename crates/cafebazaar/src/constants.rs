//! Cafe Bazaar developer API constants

/// Production base URL of the developer API. Route templates are appended to it.
pub const DEFAULT_BASE_URL: &str = "https://pardakht.cafebazaar.ir/devapi/v2";

/// Query parameter carrying the bearer token on billing calls
pub const ACCESS_TOKEN_PARAM: &str = "access_token";

/// Grant type sent to the auth endpoint when exchanging a refresh token
pub const REFRESH_GRANT_TYPE: &str = "refresh_token";

/// Plain-text body the API answers with (HTTP 200) once the access token is stale
pub const ACCESS_TOKEN_EXPIRED_BODY: &str = "Access token has been expired";

/// Seconds shaved off a token's declared lifetime when computing its expiry,
/// so a token never expires while a request carrying it is in flight.
pub const EXPIRY_SAFETY_MARGIN_SECS: i64 = 10;
