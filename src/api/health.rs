use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};
use tokio::sync::Mutex;

use crate::types::PkceToken;

/// Reports liveness and whether the pending authorization has completed.
pub async fn health(
    Extension(shared_state): Extension<Arc<Mutex<Option<PkceToken>>>>,
) -> Json<Value> {
    let state = shared_state.lock().await;
    let service = state.as_ref().map(|s| s.provider.service.as_str());
    let authorized = state.as_ref().is_some_and(|s| s.token.is_some());

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": service,
        "authorized": authorized,
    }))
}
