//! Application-only OAuth2 for the forum API.
//!
//! Read-only scraping needs no user context, so the client-credentials grant
//! is enough. Tokens are cached until shortly before they expire.

use intel_core::{ConfigError, CoreError, ForumApiError, ForumConfig, ForumCredentials};
use oauth2::basic::BasicClient;
use oauth2::{AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, TokenResponse, TokenUrl};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
/// Reddit issues one-hour application tokens.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl ForumToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

#[derive(Debug)]
pub struct AppOnlyAuth {
    oauth_client: BasicClient,
    http_client: Client,
    token: Mutex<Option<ForumToken>>,
}

impl AppOnlyAuth {
    pub fn new(
        config: &ForumConfig,
        credentials: &ForumCredentials,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(config.auth_url.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "forum.auth_url".to_string(),
                value: e.to_string(),
            }
        })?;
        let token_url = TokenUrl::new(config.token_url.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "forum.token_url".to_string(),
                value: e.to_string(),
            }
        })?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        // The token endpoint rejects requests without a descriptive user agent.
        let http_client = Client::builder()
            .user_agent(&credentials.user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            oauth_client,
            http_client,
            token: Mutex::new(None),
        })
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .lock()
            .await
            .as_ref()
            .map(|token| !token.is_expired())
            .unwrap_or(false)
    }

    pub async fn set_token(&self, token: ForumToken) {
        *self.token.lock().await = Some(token);
    }

    /// Returns a valid access token, requesting a new one if needed.
    pub async fn access_token(&self) -> Result<String, CoreError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.access_token.clone());
        }

        debug!("Requesting application-only forum token");
        let http_client = self.http_client.clone();
        let response = self
            .oauth_client
            .exchange_client_credentials()
            .request_async(move |request| send_token_request(http_client, request))
            .await
            .map_err(|e| {
                CoreError::ForumApi(ForumApiError::AuthenticationFailed {
                    reason: e.to_string(),
                })
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let token = ForumToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
        };
        info!("Obtained forum token valid for {:?}", lifetime);

        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }
}

async fn send_token_request(
    client: Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
