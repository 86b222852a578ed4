use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// An authorized-user Google credential: the client pair the refresh
/// grant is issued against, the refresh token itself, and whatever access
/// token is currently cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsCredential {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default = "default_expiry")]
    pub expiry: DateTime<Utc>,
}

fn default_expiry() -> DateTime<Utc> {
    Utc::now()
}

impl SheetsCredential {
    /// Return true if current time is within 5 minutes of expiry
    /// (inclusive). The early-expiry buffer avoids using a token that
    /// dies mid-request.
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::minutes(5) >= self.expiry
    }

    /// Load a credential JSON file (the `authorized_user` layout written
    /// by gcloud and client libraries).
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let cred: SheetsCredential = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "loaded credential file");
        Ok(cred)
    }

    /// Record a freshly issued access token with its lifetime.
    pub(crate) fn store_access_token(&mut self, token: String, expires_in_secs: i64) {
        self.access_token = Some(token);
        self.expiry = Utc::now() + Duration::seconds(expires_in_secs);
    }
}
