//! Error taxonomy for token refresh and billing calls
//!
//! The upstream API has no uniform error envelope: failures arrive as status
//! codes, plain-text sentinel bodies or empty JSON objects. Every one of them
//! is mapped to exactly one variant here, with the status code and raw body
//! kept alongside where they exist.

/// Errors from the billing client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot initiate request: {0}")]
    CannotInitiateRequest(String),

    #[error("cannot send request: {0}")]
    CannotSendRequest(String),

    #[error("invalid credentials: auth endpoint returned {status}: {body}")]
    InvalidCredentials { status: u16, body: String },

    #[error("cannot get access token: {0}")]
    CannotGetAccessToken(String),

    #[error("cannot get data: upstream returned {status}: {body}")]
    CannotGetData { status: u16, body: String },

    #[error("cannot read response body: {0}")]
    CannotReadBody(String),

    #[error("access token has expired")]
    AccessTokenExpired,

    #[error("cannot find resource")]
    CannotFindResource,

    #[error("cannot parse JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("transaction not found")]
    TransactionNotFound,

    #[error("credential file: {0}")]
    Config(#[from] common::Error),
}

impl Error {
    /// Short stable label, used as the `outcome` metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Error::CannotInitiateRequest(_) => "cannot_initiate_request",
            Error::CannotSendRequest(_) => "cannot_send_request",
            Error::InvalidCredentials { .. } => "invalid_credentials",
            Error::CannotGetAccessToken(_) => "cannot_get_access_token",
            Error::CannotGetData { .. } => "cannot_get_data",
            Error::CannotReadBody(_) => "cannot_read_body",
            Error::AccessTokenExpired => "access_token_expired",
            Error::CannotFindResource => "cannot_find_resource",
            Error::Json(_) => "json",
            Error::TransactionNotFound => "transaction_not_found",
            Error::Config(_) => "config",
        }
    }
}

/// Result alias for billing client operations.
pub type Result<T> = std::result::Result<T, Error>;
