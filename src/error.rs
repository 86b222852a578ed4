use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use reqwest::StatusCode;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SheetbaseError {
    #[error("key {key} does not exist in store {store}")]
    KeyNotFound { store: String, key: String },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("no sheet named {0} in workbook")]
    SheetNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("upstream error with status {status}: {message}")]
    Upstream { status: StatusCode, message: String },

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server { error: String },

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

pub type Result<T> = std::result::Result<T, SheetbaseError>;

impl SheetbaseError {
    /// True for the absence conditions callers are expected to treat as
    /// recoverable (missing key, field, or sheet).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SheetbaseError::KeyNotFound { .. }
                | SheetbaseError::FieldNotFound(_)
                | SheetbaseError::SheetNotFound(_)
        )
    }
}

type TokenExchangeError = RequestTokenError<
    HttpClientError<ReqwestClientError>,
    StandardErrorResponse<BasicErrorResponseType>,
>;

impl From<TokenExchangeError> for SheetbaseError {
    fn from(e: TokenExchangeError) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => SheetbaseError::Oauth2Server {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(wrapper) => match wrapper {
                HttpClientError::Reqwest(real_err) => SheetbaseError::Reqwest(*real_err),
                other => SheetbaseError::Unexpected(format!("HttpClientError: {:?}", other)),
            },
            RequestTokenError::Parse(parse_err, _body) => {
                SheetbaseError::Json(parse_err.into_inner())
            }
            RequestTokenError::Other(s) => SheetbaseError::Unexpected(s),
        }
    }
}
