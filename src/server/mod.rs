//! HTTP surface: the page, the inspire endpoint and the uploads passthrough.

pub mod error;
pub mod request;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::services::ServeDir;

use crate::inspire::{Inspirer, PaletteSource, PromptResponse};
use error::ApiError;
use request::InspireForm;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Shared state for axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub inspirer: Arc<Inspirer>,
    /// Fixed seed for every request's random source; entropy when `None`.
    pub seed: Option<u64>,
}

impl AppState {
    pub fn new(inspirer: Inspirer, seed: Option<u64>) -> Self {
        Self {
            inspirer: Arc::new(inspirer),
            seed,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let uploads = ServeDir::new(state.inspirer.uploads().dir());

    Router::new()
        .route("/", get(index_handler))
        .route("/api/inspire", post(inspire_handler))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("shutting down");
}

// --- Handlers ---

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn inspire_handler(
    State(state): State<AppState>,
    form: InspireForm,
) -> Result<Json<PromptResponse>, ApiError> {
    let prompt = form
        .prompt
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingPrompt)?;
    let image = form.image;
    log::debug!(
        "inspire: prompt={prompt:?} image={:?}",
        image.as_ref().map(|i| (&i.file_name, i.bytes.len()))
    );

    // Disk write, decode and quantization all block
    let mut rng = state.rng();
    let inspirer = Arc::clone(&state.inspirer);
    let (response, source) = tokio::task::spawn_blocking(move || {
        inspirer.respond(&prompt, image.as_ref(), &mut rng)
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    if source == PaletteSource::Preset {
        log::debug!("inspire: answered with a preset palette");
    }
    Ok(Json(response))
}
