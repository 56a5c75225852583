use std::sync::Arc;

use axum::{Extension, response::Json};
use serde_json::{Value, json};

use crate::spotify::auth::AuthSession;

/// Liveness plus where the authorization flow stands.
pub async fn health(Extension(session): Extension<Arc<AuthSession>>) -> Json<Value> {
    let state = match session.pending.lock().await.as_ref() {
        Some(pending) if pending.token.is_some() => "authorized",
        Some(pending) if pending.error.is_some() => "failed",
        Some(_) => "awaiting_callback",
        None => "idle",
    };

    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "authorization": state,
    }))
}
