//! OAuth 2.0 authorization code flow with PKCE, shared by Spotify and YouTube.
//!
//! 1. A code verifier is generated and its SHA256 challenge derived
//! 2. The local callback server is started
//! 3. The authorization URL is opened in the default browser
//! 4. The callback handler exchanges the code for a token
//! 5. The token is persisted by [`TokenManager`]
//!
//! Google additionally requires the client secret on token requests, which
//! [`OAuthProvider::client_secret`] carries.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    error, management::TokenManager, server::start_api_server, success, types::PkceToken,
    types::Service, types::Token, utils, warning,
};

#[derive(Debug, Clone)]
pub struct OAuthProvider {
    pub service: Service,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub extra_params: Vec<(String, String)>,
}

impl OAuthProvider {
    /// Authorization URL the user is sent to.
    pub fn authorize_url(&self, code_challenge: &str) -> Result<Url, String> {
        let mut params: Vec<(&str, &str)> = vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", self.scope.as_str()),
        ];
        for (k, v) in &self.extra_params {
            params.push((k.as_str(), v.as_str()));
        }

        Url::parse_with_params(&self.auth_url, &params).map_err(|e| e.to_string())
    }

    fn form<'a>(&'a self, mut params: Vec<(&'a str, &'a str)>) -> Vec<(&'a str, &'a str)> {
        params.push(("client_id", self.client_id.as_str()));
        if let Some(secret) = &self.client_secret {
            params.push(("client_secret", secret.as_str()));
        }
        params
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    expires_in: Option<u64>,
}

impl TokenResponse {
    fn into_token(self, previous_refresh_token: Option<&str>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh_token.map(str::to_string))
                .unwrap_or_default(),
            scope: self.scope,
            expires_in: self.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        }
    }
}

/// Runs the complete authorization flow for `provider` and persists the token.
///
/// Browser launch failures only print the URL for manual navigation. A
/// timeout or a failure to persist the token terminates the program.
pub async fn authorize(provider: OAuthProvider, shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let auth_url = match provider.authorize_url(&code_challenge) {
        Ok(url) => url,
        Err(e) => error!("Invalid authorization URL for {}: {}", provider.service, e),
    };

    let service = provider.service;
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            provider,
            code_verifier,
            token: None,
        });
    }

    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    match wait_for_token(shared_state).await {
        Some(t) => {
            let token_manager = TokenManager::new(service, t);
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save {} token: {}", service, e);
            }

            success!("{} authentication successful!", service);
        }
        None => {
            error!("{} authentication failed or timed out.", service);
        }
    }
}

/// Polls the shared state for a token for up to two minutes.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(120);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(token) = &pkce_token.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code and the PKCE verifier for a token.
pub async fn exchange_code_pkce(
    provider: &OAuthProvider,
    code: &str,
    verifier: &str,
) -> Result<Token, reqwest::Error> {
    let form = provider.form(vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("code_verifier", verifier),
        ("redirect_uri", provider.redirect_uri.as_str()),
    ]);

    let res = Client::new()
        .post(&provider.token_url)
        .form(&form)
        .send()
        .await?
        .error_for_status()?;

    let json: TokenResponse = res.json().await?;
    Ok(json.into_token(None))
}

/// Exchanges a refresh token for a fresh access token.
///
/// Google does not rotate refresh tokens, so the previous one is kept when
/// the response carries none.
pub async fn refresh_token(provider: &OAuthProvider, refresh_token: &str) -> Result<Token, String> {
    let form = provider.form(vec![
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ]);

    let res = Client::new()
        .post(&provider.token_url)
        .form(&form)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| e.to_string())?;

    let json: TokenResponse = res.json().await.map_err(|e| e.to_string())?;
    Ok(json.into_token(Some(refresh_token)))
}
