//! Local HTTP side channel for browser URLs. A browser extension posts the URL of the active tab
//! to `/set_url`; the classifier reads it back from `/get_url`.

pub mod client;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::{debug, error, info, warn};

pub const DEFAULT_RELAY_ADDR: &str = "0.0.0.0:5000";

/// Body returned by `/get_url` while no URL has been set.
pub const NO_URL_SENTINEL: &str = "No URL available";

pub const URL_UPDATED: &str = "URL Updated";

/// Single-slot register holding the last URL reported by the browser. Last write wins.
#[derive(Debug, Clone, Default)]
pub struct UrlStore {
    current: Arc<RwLock<Option<Arc<str>>>>,
}

impl UrlStore {
    pub async fn set(&self, url: Option<Arc<str>>) {
        *self.current.write().await = url;
    }

    pub async fn get(&self) -> Option<Arc<str>> {
        self.current.read().await.clone()
    }
}

#[derive(Debug, Deserialize)]
struct SetUrlRequest {
    url: Option<String>,
}

async fn set_url(
    State(store): State<UrlStore>,
    Json(request): Json<SetUrlRequest>,
) -> (StatusCode, &'static str) {
    debug!("Received url {:?}", request.url);
    store.set(request.url.map(Into::into)).await;
    (StatusCode::OK, URL_UPDATED)
}

async fn get_url(State(store): State<UrlStore>) -> (StatusCode, String) {
    let body = store
        .get()
        .await
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| NO_URL_SENTINEL.to_string());
    (StatusCode::OK, body)
}

pub fn router(store: UrlStore) -> Router {
    // Extensions post from their own origin, so the relay has to answer preflights.
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("*"))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/set_url", post(set_url))
        .route("/get_url", get(get_url))
        .with_state(store)
        .layer(cors)
}

/// Serves the relay on an already bound listener until `shutdown` is cancelled.
pub async fn serve(
    listener: TcpListener,
    store: UrlStore,
    shutdown: CancellationToken,
) -> Result<()> {
    info!("Relay listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

/// Binds the relay and runs it in the background. A failed bind is only logged: another
/// instance may already own the port, in which case the classifier uses that one.
pub async fn spawn_relay(
    addr: SocketAddr,
    store: UrlStore,
    shutdown: CancellationToken,
) -> Option<JoinHandle<()>> {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            warn!("Failed to bind relay on {addr}: {e}");
            return None;
        }
    };
    Some(tokio::spawn(async move {
        if let Err(e) = serve(listener, store, shutdown).await {
            error!("Relay stopped with an error {e:?}");
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;
    use tokio::net::TcpListener;
    use tokio_util::sync::CancellationToken;

    use super::{
        client::{HttpUrlSource, UrlSource},
        serve, UrlStore, NO_URL_SENTINEL, URL_UPDATED,
    };
    use crate::classify::domain_of;

    async fn start_relay() -> Result<(String, CancellationToken)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let shutdown = CancellationToken::new();
        tokio::spawn(serve(listener, UrlStore::default(), shutdown.clone()));
        Ok((base, shutdown))
    }

    async fn post_url(base: &str, body: serde_json::Value) -> Result<String> {
        let response = reqwest::Client::new()
            .post(format!("{base}/set_url"))
            .json(&body)
            .send()
            .await?;
        assert!(response.status().is_success());
        Ok(response.text().await?)
    }

    #[tokio::test]
    async fn test_get_before_set_returns_sentinel() -> Result<()> {
        let (base, shutdown) = start_relay().await?;
        let body = reqwest::get(format!("{base}/get_url")).await?.text().await?;
        assert_eq!(body, NO_URL_SENTINEL);

        let source = HttpUrlSource::new(&base, Duration::from_secs(2))?;
        assert_eq!(source.current_url().await?, None);
        shutdown.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_set_then_get() -> Result<()> {
        let (base, shutdown) = start_relay().await?;
        let answer = post_url(&base, serde_json::json!({ "url": "http://example.com/page" })).await?;
        assert_eq!(answer, URL_UPDATED);

        let source = HttpUrlSource::new(&base, Duration::from_secs(2))?;
        let url = source.current_url().await?.unwrap();
        assert_eq!(url, "http://example.com/page");
        assert_eq!(domain_of(&url).as_deref(), Some("example.com"));
        shutdown.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_last_write_wins() -> Result<()> {
        let (base, shutdown) = start_relay().await?;
        post_url(&base, serde_json::json!({ "url": "https://a.org/" })).await?;
        post_url(&base, serde_json::json!({ "url": "https://b.org/x" })).await?;
        let body = reqwest::get(format!("{base}/get_url")).await?.text().await?;
        assert_eq!(body, "https://b.org/x");

        post_url(&base, serde_json::json!({})).await?;
        let body = reqwest::get(format!("{base}/get_url")).await?.text().await?;
        assert_eq!(body, NO_URL_SENTINEL);
        shutdown.cancel();
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_an_error() -> Result<()> {
        // Bind and drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        drop(listener);

        let source = HttpUrlSource::new(&format!("http://{addr}"), Duration::from_secs(2))?;
        assert!(source.current_url().await.is_err());
        Ok(())
    }
}
