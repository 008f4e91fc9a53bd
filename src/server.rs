//! HTTP surface: generate, delete, and static serving of the public directory

use crate::config::ServerConfig;
use crate::request::{DeleteSpec, PostSpec};
use crate::store::FileStore;
use crate::{rendering, Error, RenderPool, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    routing::{delete, get, post},
    Json, Router,
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;
use url::Url;

#[derive(Clone)]
pub struct AppState {
    pub store: FileStore,
    pub renderer: RenderPool,
    /// Overrides the request-derived base for returned links
    pub public_base_url: Option<Url>,
    /// Host used when a request carries no usable Host header
    pub fallback_host: String,
}

impl AppState {
    pub fn new(store: FileStore, renderer: RenderPool, config: &ServerConfig) -> Self {
        let fallback_host = if config.bind.ip().is_unspecified() {
            format!("localhost:{}", config.bind.port())
        } else {
            config.bind.to_string()
        };
        Self {
            store,
            renderer,
            public_base_url: config.public_base_url.clone(),
            fallback_host,
        }
    }

    /// Base for returned links: the configured base or the request's Host
    /// header.
    pub fn public_base(&self, headers: &HeaderMap) -> Result<Url> {
        match &self.public_base_url {
            Some(base) => Ok(base.clone()),
            None => headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .and_then(request_base)
                .or_else(|| request_base(&self.fallback_host))
                .ok_or_else(|| Error::ConfigError(format!("Unusable host {:?}", self.fallback_host))),
        }
    }

    /// Absolute link to a stored file
    pub fn public_url(&self, headers: &HeaderMap, file_name: &str) -> Result<String> {
        join_url(&self.public_base(headers)?, file_name)
    }
}

fn join_url(base: &Url, file_name: &str) -> Result<String> {
    base.join(file_name)
        .map(String::from)
        .map_err(|e| Error::ConfigError(format!("Cannot join {:?} onto {}: {}", file_name, base, e)))
}

/// `http://<host>/` when `host` is a bare authority, else `None`.
fn request_base(host: &str) -> Option<Url> {
    let url = Url::parse(&format!("http://{}/", host)).ok()?;
    let bare = url.host_str().is_some() && url.path() == "/" && url.query().is_none() && url.fragment().is_none();
    if bare && url.username().is_empty() {
        Some(url)
    } else {
        debug!("Ignoring unusable Host header {:?}", host);
        None
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(state.store.dir());
    Router::new()
        .route("/generate-post", post(generate_post))
        .route("/delete-image", delete(delete_image))
        .route("/health", get(health))
        .fallback_service(static_files)
        .with_state(state)
}

async fn generate_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerateResponse>> {
    let post = PostSpec::from_body(&body)?;
    // Resolved up front so a bad base never leaves a file behind.
    let base = state.public_base(&headers)?;
    debug!("Composing post ({} / {})", post.direction.as_str(), post.language);

    let document = rendering::compose(&post);
    let shot = state.renderer.capture(document).await?;
    if shot.jpeg_data.is_empty() {
        return Err(Error::RenderFailure("Renderer returned no image data".into()));
    }

    let stored = state.store.save(&shot.jpeg_data).await?;
    let image_url = match join_url(&base, &stored.file_name) {
        Ok(url) => url,
        Err(e) => {
            if let Err(cleanup) = state.store.delete(&stored.file_name).await {
                warn!("Failed to remove {} after error: {}", stored.file_name, cleanup);
            }
            return Err(e);
        }
    };

    Ok(Json(GenerateResponse {
        image_url,
        file_name: stored.file_name,
    }))
}

async fn delete_image(State(state): State<AppState>, body: Bytes) -> Result<Json<DeleteResponse>> {
    let spec = DeleteSpec::from_body(&body)?;
    state.store.delete(&spec.file_name).await?;
    Ok(Json(DeleteResponse {
        message: "File deleted successfully.".to_string(),
    }))
}

async fn health() -> &'static str {
    "ok"
}
