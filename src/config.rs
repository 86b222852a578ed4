use crate::auth::SheetsCredential;
use serde::{Deserialize, Serialize};
use sheetbase_schema::ValueInputOption;
use std::path::PathBuf;
use url::Url;

/// Where the client obtains its Google credential from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// Path to an authorized-user credential JSON file
    /// (client id/secret + refresh token).
    File(PathBuf),

    /// Credential supplied directly by the caller.
    Inline(SheetsCredential),

    /// A fixed bearer token, never refreshed. Intended for tests and
    /// emulator endpoints.
    StaticToken(String),
}

/// Construction-time configuration bag for a [`Database`](crate::Database):
/// a credential source plus the knobs the wire client honors on writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub credentials: CredentialSource,

    /// How written cells are interpreted by the service. The default
    /// matches the spreadsheet UI: numeric and date strings are parsed,
    /// not stored as literal text.
    #[serde(default)]
    pub value_input: ValueInputOption,

    /// Override for the Sheets API base URL (tests, proxies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,
}

impl DatabaseConfig {
    pub fn with_credential_file(path: impl Into<PathBuf>) -> Self {
        Self {
            credentials: CredentialSource::File(path.into()),
            value_input: ValueInputOption::default(),
            endpoint: None,
        }
    }

    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            credentials: CredentialSource::StaticToken(token.into()),
            value_input: ValueInputOption::default(),
            endpoint: None,
        }
    }
}
