use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;

use crate::{Error, Res, api, spotify::auth::AuthSession};

/// Binds the callback listener so address problems surface before the
/// browser is opened.
pub async fn bind(addr: &str) -> Res<TcpListener> {
    let addr = SocketAddr::from_str(addr)
        .map_err(|e| Error::Config(format!("invalid SERVER_ADDRESS `{addr}`: {e}")))?;
    Ok(TcpListener::bind(&addr).await?)
}

pub async fn serve(listener: TcpListener, session: Arc<AuthSession>) -> Res<()> {
    let app = Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback))
        .layer(Extension(session));

    axum::serve(listener, app).await?;
    Ok(())
}
