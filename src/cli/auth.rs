use std::sync::Arc;

use crate::{
    config, error,
    management::TokenFile,
    spotify::{self, HttpTransport},
    success,
};

pub async fn auth() {
    let provider = super::provider_config();
    let store = TokenFile::new(config::tokens_path());

    match spotify::auth::auth(
        &provider,
        &config::server_addr(),
        Arc::new(HttpTransport::new()),
        &store,
    )
    .await
    {
        Ok(_) => success!("Authenticated. Tokens saved to {}", store.path().display()),
        Err(e) => error!("Authentication failed. Err: {}", e),
    }
}
