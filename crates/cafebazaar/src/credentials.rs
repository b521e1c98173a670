//! Client credentials and the JSON credential file
//!
//! The file holds one flat object:
//!
//! ```json
//! {
//!   "refresh_token": "...",
//!   "access_token": "...",
//!   "client_id": "...",
//!   "client_secret": "...",
//!   "expires_at": 1735500000
//! }
//! ```
//!
//! `expires_at` is a unix timestamp in seconds. Writes go through a temp file
//! and a rename so a crash mid-write never leaves a truncated file behind.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use common::Secret;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suffix for temp file names, so concurrent saves never share one.
static SAVE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Lifecycle state of the access token held in a set of credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// No access token has been issued yet.
    Unauthenticated,
    /// A token is present and `now < expires_at`.
    Authenticated,
    /// A token is present but `now >= expires_at`.
    Expired,
}

/// OAuth client credentials plus the current access token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub refresh_token: Secret<String>,
    #[serde(default)]
    pub access_token: Secret<String>,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Secret<String>,
    /// Expiration as unix timestamp in seconds
    #[serde(default)]
    pub expires_at: i64,
}

impl Credentials {
    /// Credentials with no access token issued yet.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            refresh_token: Secret::new(refresh_token.into()),
            access_token: Secret::default(),
            client_id: client_id.into(),
            client_secret: Secret::new(client_secret.into()),
            expires_at: 0,
        }
    }

    /// Token state at `now` (unix seconds).
    pub fn state(&self, now: i64) -> TokenState {
        if self.access_token.is_empty() {
            TokenState::Unauthenticated
        } else if now >= self.expires_at {
            TokenState::Expired
        } else {
            TokenState::Authenticated
        }
    }

    /// Whether a refresh is needed before an authenticated call at `now`.
    pub fn needs_refresh(&self, now: i64) -> bool {
        self.state(now) != TokenState::Authenticated
    }

    /// Read credentials from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> common::Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await?;
        let credentials: Credentials = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), expires_at = credentials.expires_at, "loaded credentials");
        Ok(credentials)
    }

    /// Write the credentials to `path`, replacing the file in full.
    ///
    /// Uses atomic write (temp file + rename). File permissions are set to
    /// 0600 (owner read/write only) since the file contains tokens.
    pub async fn save(&self, path: impl AsRef<Path>) -> common::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            Some(_) => Path::new("."),
            None => {
                return Err(common::Error::Config(
                    "credential path has no parent directory".into(),
                ));
            }
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| common::Error::Config("credential path has no file name".into()))?;

        let tmp_path = dir.join(format!(
            ".{}.tmp.{}.{}",
            file_name.to_string_lossy(),
            std::process::id(),
            SAVE_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        tokio::fs::write(&tmp_path, json.as_bytes()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&tmp_path, perms).await?;
        }

        tokio::fs::rename(&tmp_path, path).await?;

        debug!(path = %path.display(), "persisted credentials");
        Ok(())
    }
}

/// Current unix time in seconds.
pub(crate) fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
