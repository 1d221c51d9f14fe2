use std::path::PathBuf;

use chrono::Utc;

use crate::{
    config,
    error::SyncError,
    oauth,
    types::{Service, Token},
};

/// Seconds before expiry at which a token is already treated as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Persisted OAuth token of one service.
pub struct TokenManager {
    service: Service,
    token: Token,
}

impl TokenManager {
    pub fn new(service: Service, token: Token) -> Self {
        TokenManager { service, token }
    }

    pub async fn load(service: Service) -> Result<Self, String> {
        let path = Self::token_path(service);
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self { service, token })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path(self.service);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and persisting it first when it
    /// is about to expire.
    ///
    /// A failed refresh is fatal: every further call would be rejected.
    pub async fn get_valid_token(&mut self) -> Result<String, SyncError> {
        if self.is_expired() {
            let provider = config::oauth_provider(self.service)?;
            let new_token = oauth::refresh_token(&provider, &self.token.refresh_token)
                .await
                .map_err(|e| {
                    SyncError::Fatal(format!(
                        "Failed to refresh {} token: {}. Run spytcli auth {}",
                        self.service,
                        e,
                        self.service.as_str()
                    ))
                })?;
            self.token = new_token;
            let _ = self.persist().await;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now + EXPIRY_MARGIN_SECS >= self.token.obtained_at + self.token.expires_in
    }

    fn token_path(service: Service) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("spytcli/cache/{}-token.json", service.as_str()));
        path
    }
}
