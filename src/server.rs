use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{Res, api, types::AuthCallback};

pub fn router(state: Arc<Mutex<Option<AuthCallback>>>) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Binds the callback server. Serving happens on the returned listener so
/// that bind errors surface before the browser is opened.
pub async fn bind(addr: &str) -> Res<TcpListener> {
    let addr: SocketAddr = addr.parse()?;
    Ok(TcpListener::bind(addr).await?)
}

pub async fn serve(listener: TcpListener, state: Arc<Mutex<Option<AuthCallback>>>) -> Res<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}
