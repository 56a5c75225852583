use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};

use crate::{spotify::auth::AuthSession, warning};

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(session): Extension<Arc<AuthSession>>,
) -> Html<&'static str> {
    let mut state = session.pending.lock().await;
    let Some(pending) = state.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if let Some(error) = params.get("error") {
        pending.error = Some(error.clone());
        return Html("<h4>Authentication failed.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let verifier = pending.code_verifier.clone();
    match session
        .auth
        .exchange_code(code, &verifier, &session.redirect_uri)
        .await
    {
        Ok(token) => {
            pending.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pending.error = Some(e.to_string());
            Html("<h4>Failed to exchange authorization code.</h4>")
        }
    }
}
