//! URL-encoded form body for the token refresh POST

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Content-Type for form-urlencoded data.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Flat string-to-string form. Keys are unique and serialized in sorted order.
#[derive(Clone, Default)]
pub struct Form(BTreeMap<String, String>);

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Encode the form, returning the body and its content type.
    pub fn build(&self) -> Result<(String, &'static str)> {
        let body = serde_urlencoded::to_string(&self.0)
            .map_err(|e| Error::CannotInitiateRequest(format!("failed to encode form: {e}")))?;
        Ok((body, FORM_CONTENT_TYPE))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Form {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

// Values carry client secrets and refresh tokens, so only keys are shown.
impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}
