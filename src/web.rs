//! Server-rendered dashboard: the event matrix and the cluster detail view.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::client::{ApiClient, ClusterQuery};
use crate::environment::{build_info, DashboardConfig};
use crate::error::{AppError, AppResult};
use crate::render::templates::STYLESHEET;
use crate::render::{DetailPage, ListingPage};
use crate::view_state::ViewState;
use crate::{TARGET_HTTP, TARGET_RENDER};

/// Shared by every handler.
#[derive(Debug)]
pub struct AppState {
    pub client: ApiClient,
    pub config: DashboardConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub v: Option<u32>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(listing))
        .route("/cluster/{id}", get(detail))
        .route("/static/app.css", get(stylesheet))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Event matrix. A failed backend still renders the page, with the empty
/// placeholder and the failure notice.
async fn listing(
    State(state): State<Arc<AppState>>,
    Query(mut query): Query<ClusterQuery>,
) -> AppResult<Html<String>> {
    if query.limit.is_none() {
        query.limit = state.config.cluster_limit;
    }

    let (clusters, system) = tokio::join!(
        state.client.fetch_clusters(&query),
        state.client.fetch_state()
    );

    let system = match system {
        Ok(system) => Some(system),
        Err(err) => {
            debug!(target: TARGET_HTTP, "System state unavailable: {}", err);
            None
        }
    };

    let view = ViewState::from_collection(clusters);
    if let Some(reason) = view.failure() {
        warn!(target: TARGET_HTTP, "Listing rendered without clusters: {}", reason);
    }

    let page = ListingPage::new(&view, query, system, Utc::now());
    let html = page.render().map_err(|err| {
        error!(target: TARGET_RENDER, "Failed to render listing: {}", err);
        err
    })?;
    Ok(Html(html))
}

async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
) -> AppResult<Html<String>> {
    if id.trim().is_empty() {
        return Err(AppError::NotFound("cluster".to_string()));
    }

    let cluster = state.client.fetch_cluster(&id, params.v).await?;
    let page = DetailPage::new(&id, params.v, &ViewState::Loaded(cluster));
    let html = page.render().map_err(|err| {
        error!(target: TARGET_RENDER, "Failed to render cluster {}: {}", id, err);
        err
    })?;
    Ok(Html(html))
}

async fn stylesheet() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        STYLESHEET,
    )
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "build": build_info(),
        "api_base": state.client.base_url().as_str(),
    }))
}

/// Binds `config.bind_addr` and serves until ctrl-c.
pub async fn serve(config: DashboardConfig) -> Result<()> {
    let client = ApiClient::from_config(&config)?;
    let addr: SocketAddr = config.bind_addr;
    info!(
        target: TARGET_HTTP,
        "Reading observations from {}",
        client.base_url()
    );

    let app = router(Arc::new(AppState { client, config }));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(target: TARGET_HTTP, "Dashboard running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Dashboard server failed")?;

    info!(target: TARGET_HTTP, "Dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_err() {
        error!("Failed to listen for ctrl-c");
    }
    info!("Shutdown requested");
}
