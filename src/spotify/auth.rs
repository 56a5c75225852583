use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Method, Url};
use tokio::sync::Mutex;

use crate::{
    Error, Res,
    config::ProviderConfig,
    management::{CredentialStore, TokenRefresher},
    info, server,
    spotify::transport::{ApiRequest, Transport},
    types::{PkceToken, TokenResponse, TokenState},
    utils, warning,
};

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Client for the accounts service token endpoint.
#[derive(Clone)]
pub struct SpotifyAuth {
    transport: Arc<dyn Transport>,
    token_url: String,
    client_id: String,
    client_secret: Option<String>,
}

impl SpotifyAuth {
    pub fn new(transport: Arc<dyn Transport>, config: &ProviderConfig) -> Self {
        Self {
            transport,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
        }
    }

    /// Trades an authorization code plus PKCE verifier for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
    ) -> Res<TokenState> {
        let response = self
            .token_request(vec![
                ("grant_type".into(), "authorization_code".into()),
                ("code".into(), code.into()),
                ("code_verifier".into(), verifier.into()),
                ("redirect_uri".into(), redirect_uri.into()),
            ])
            .await?;

        let refresh_token = response
            .refresh_token
            .ok_or_else(|| Error::Authorization("no refresh token was issued".into()))?;

        Ok(TokenState {
            access_token: response.access_token,
            refresh_token,
            expires_at: Utc::now().timestamp_millis() + (response.expires_in as i64) * 1000,
        })
    }

    async fn token_request(&self, mut fields: Vec<(String, String)>) -> Res<TokenResponse> {
        fields.push(("client_id".into(), self.client_id.clone()));
        if let Some(secret) = &self.client_secret {
            fields.push(("client_secret".into(), secret.clone()));
        }

        let request = ApiRequest::new(Method::POST, &self.token_url).form(fields);
        let body = self.transport.execute(request).await?.into_result()?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl TokenRefresher for SpotifyAuth {
    async fn refresh(&self, refresh_token: &str) -> Res<TokenResponse> {
        self.token_request(vec![
            ("grant_type".into(), "refresh_token".into()),
            ("refresh_token".into(), refresh_token.into()),
        ])
        .await
        .map_err(|e| Error::TokenRefresh(e.to_string()))
    }
}

/// State shared between the authorization flow and the callback handler.
pub struct AuthSession {
    pub auth: SpotifyAuth,
    pub redirect_uri: String,
    pub pending: Mutex<Option<PkceToken>>,
}

/// Builds the URL the user opens to grant access.
pub fn authorize_url(config: &ProviderConfig, code_challenge: &str) -> Res<Url> {
    Url::parse_with_params(
        &config.auth_url,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", config.scope.as_str()),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization URL: {e}")))
}

/// Runs the one-time authorization code flow and persists the tokens.
///
/// Starts the local callback server, opens the browser (or prints the URL)
/// and waits for the callback to deliver a token.
pub async fn auth(
    config: &ProviderConfig,
    server_addr: &str,
    transport: Arc<dyn Transport>,
    store: &dyn CredentialStore,
) -> Res<TokenState> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let auth_url = authorize_url(config, &code_challenge)?;

    let session = Arc::new(AuthSession {
        auth: SpotifyAuth::new(transport, config),
        redirect_uri: config.redirect_uri.clone(),
        pending: Mutex::new(Some(PkceToken {
            code_verifier,
            token: None,
            error: None,
        })),
    });

    let listener = server::bind(server_addr).await?;
    let server = tokio::spawn(server::serve(listener, Arc::clone(&session)));

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    } else {
        info!("Open this URL if the browser did not start:\n{}", auth_url);
    }

    let result = wait_for_token(&session).await;
    server.abort();

    let token = result?;
    store.save(&token).await?;
    Ok(token)
}

async fn wait_for_token(session: &AuthSession) -> Res<TokenState> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        {
            let lock = session.pending.lock().await;
            if let Some(pending) = lock.as_ref() {
                if let Some(token) = &pending.token {
                    return Ok(token.clone());
                }
                if let Some(reason) = &pending.error {
                    return Err(Error::Authorization(reason.clone()));
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    Err(Error::Authorization("timed out waiting for the callback".into()))
}
