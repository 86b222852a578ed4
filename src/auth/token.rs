use super::SheetsCredential;
use crate::config::CredentialSource;
use crate::error::Result;
use oauth2::basic::BasicClient;
use oauth2::{ClientId, ClientSecret, EndpointNotSet, EndpointSet, RefreshToken, TokenResponse, TokenUrl};
use tokio::sync::Mutex;
use tracing::info;

const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

// Google's default when the token response omits expires_in.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

type RefreshClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Supplies a bearer token for every grid call, refreshing through the
/// OAuth2 refresh grant when the cached token is near expiry.
pub(crate) enum TokenProvider {
    Static(String),
    Refreshing(Box<RefreshingProvider>),
}

pub(crate) struct RefreshingProvider {
    http: reqwest::Client,
    oauth: RefreshClient,
    state: Mutex<SheetsCredential>,
}

impl TokenProvider {
    pub(crate) fn from_source(source: &CredentialSource, http: reqwest::Client) -> Result<Self> {
        let credential = match source {
            CredentialSource::StaticToken(token) => {
                return Ok(TokenProvider::Static(token.clone()));
            }
            CredentialSource::Inline(credential) => credential.clone(),
            CredentialSource::File(path) => SheetsCredential::from_file(path)?,
        };

        let oauth = BasicClient::new(ClientId::new(credential.client_id.clone()))
            .set_client_secret(ClientSecret::new(credential.client_secret.clone()))
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URI.to_string())?);

        Ok(TokenProvider::Refreshing(Box::new(RefreshingProvider {
            http,
            oauth,
            state: Mutex::new(credential),
        })))
    }

    /// Current access token, refreshed first if the cached one is stale.
    pub(crate) async fn access_token(&self) -> Result<String> {
        let provider = match self {
            TokenProvider::Static(token) => return Ok(token.clone()),
            TokenProvider::Refreshing(provider) => provider,
        };

        let mut state = provider.state.lock().await;
        if let Some(token) = state.access_token.as_ref() {
            if !state.is_expired() {
                return Ok(token.clone());
            }
        }

        let token_result = provider
            .oauth
            .exchange_refresh_token(&RefreshToken::new(state.refresh_token.clone()))
            .request_async(&provider.http)
            .await?;

        let access_token = token_result.access_token().secret().clone();
        let expires_in = token_result
            .expires_in()
            .and_then(|d| i64::try_from(d.as_secs()).ok())
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
        state.store_access_token(access_token.clone(), expires_in);
        info!("access token refreshed");

        Ok(access_token)
    }
}
