use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{config, error, info, oauth, types::PkceToken, types::Service};

pub async fn auth(service: Service, shared_state: Arc<Mutex<Option<PkceToken>>>) {
    let provider = match config::oauth_provider(service) {
        Ok(provider) => provider,
        Err(e) => error!("Cannot authorize with {}: {}", service, e),
    };

    info!("Authorizing with {}...", service);
    oauth::authorize(provider, shared_state).await;
}
