// Axum Catalog Server
//
// Purpose: Serve the program catalog as server-rendered pages plus a JSON API.
// The page query string carries the filter/sort state, so every listing URL
// is shareable and reloads into the same view.

#[cfg(feature = "api")]
use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};

#[cfg(feature = "api")]
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};

#[cfg(feature = "api")]
use moka::future::Cache;

#[cfg(feature = "api")]
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "api")]
use std::sync::Arc;

#[cfg(feature = "api")]
use std::time::Duration;

#[cfg(feature = "api")]
use tokio::sync::{Mutex, RwLock};

#[cfg(feature = "api")]
use crate::catalog::{load_catalog, CatalogState};

#[cfg(feature = "api")]
use crate::config::SiteConfig;

#[cfg(feature = "api")]
use crate::controller::ViewState;

#[cfg(feature = "api")]
use crate::error::RenderError;

#[cfg(feature = "api")]
use crate::loader::DocumentLoader;

#[cfg(feature = "api")]
use crate::render::{self, RenderOptions};

#[cfg(feature = "api")]
use crate::resolver::SourceResolver;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state (thread-safe, cloneable)
#[cfg(feature = "api")]
#[derive(Clone)]
pub struct AppState {
    /// Current catalog; replaced wholesale on reload
    pub catalog: Arc<RwLock<Arc<CatalogState>>>,
    /// Bumped on every swap, only while the catalog write lock is held
    generation: Arc<AtomicU64>,
    /// Serializes rebuilds so they install in the order they ran
    rebuild_lock: Arc<Mutex<()>>,
    pub resolver: Arc<SourceResolver>,
    pub loader: Arc<DocumentLoader>,
    /// Rendered listing pages keyed by canonical query
    pub cache: Cache<String, String>,
    pub render_options: RenderOptions,
}

#[cfg(feature = "api")]
impl AppState {
    pub async fn new(config: &SiteConfig) -> anyhow::Result<Self> {
        tracing::info!("Initializing site fetcher for {}...", config.site_root);
        let fetcher = config.fetcher()?;

        let resolver = config.resolver(fetcher.clone());
        let loader = config.loader(fetcher);
        let render_options = RenderOptions::server(&config.default_image);

        Ok(Self::from_parts(resolver, loader, render_options).await)
    }

    /// Build state from ready-made pipeline parts and load the first catalog.
    pub async fn from_parts(
        resolver: SourceResolver,
        loader: DocumentLoader,
        render_options: RenderOptions,
    ) -> Self {
        tracing::info!("Initializing Moka page cache...");
        let cache = Cache::builder()
            .max_capacity(1_000)
            .time_to_live(Duration::from_secs(300))
            .build();

        tracing::info!("Loading program catalog...");
        let initial = load_catalog(&resolver, &loader).await;

        Self {
            catalog: Arc::new(RwLock::new(Arc::new(initial))),
            generation: Arc::new(AtomicU64::new(0)),
            rebuild_lock: Arc::new(Mutex::new(())),
            resolver: Arc::new(resolver),
            loader: Arc::new(loader),
            cache,
            render_options,
        }
    }

    pub async fn current(&self) -> Arc<CatalogState> {
        self.catalog.read().await.clone()
    }

    /// Number of catalog swaps so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Rebuild the catalog from scratch and swap it in.
    pub async fn reload(&self) -> Arc<CatalogState> {
        let _rebuild = self.rebuild_lock.lock().await;
        self.rebuild().await
    }

    /// Retry a failed catalog observed at generation `seen`.
    ///
    /// Callers that queued behind another retry get that retry's result
    /// instead of starting their own.
    pub async fn recover(&self, seen: u64) -> Arc<CatalogState> {
        let _rebuild = self.rebuild_lock.lock().await;
        if self.generation() != seen {
            tracing::debug!("Catalog already rebuilt since generation {}", seen);
            return self.current().await;
        }
        self.rebuild().await
    }

    // Caller holds `rebuild_lock`.
    async fn rebuild(&self) -> Arc<CatalogState> {
        let fresh = Arc::new(load_catalog(&self.resolver, &self.loader).await);

        // Invalidate under the write lock: page inserts happen under the read
        // lock, so no page rendered from the old catalog can outlive this.
        let mut current = self.catalog.write().await;
        *current = fresh.clone();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.cache.invalidate_all();
        drop(current);

        tracing::info!("Catalog reloaded (generation {}); page cache cleared", generation);
        fresh
    }
}

// ============================================================================
// Router Configuration
// ============================================================================

#[cfg(feature = "api")]
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))

        // Server-rendered pages
        .route("/programs", get(list_programs))
        .route("/programs/:id", get(program_detail))

        // JSON API
        .route("/api/programs", get(api_programs))
        .route("/api/catalog/reload", post(reload_catalog))

        // Middleware (applied in reverse order)
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Endpoint Handlers
// ============================================================================

#[cfg(feature = "api")]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let catalog = state.current().await;
    let programs = catalog.catalog().map(|c| c.len()).unwrap_or(0);

    Json(serde_json::json!({
        "status": if catalog.is_failed() { "degraded" } else { "healthy" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "programs": programs
    }))
}

#[cfg(feature = "api")]
async fn list_programs(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, AppError> {
    let view = ViewState::from_query(query.as_deref().unwrap_or(""));
    let cache_key = view.to_query();

    if let Some(cached) = state.cache.get(&cache_key).await {
        tracing::debug!("Listing cache hit: '{}'", cache_key);
        return Ok(Html(cached));
    }

    // The error panel's retry link lands here; try again before rendering
    let mut catalog = state.catalog.read().await;
    if catalog.is_failed() {
        let seen = state.generation();
        drop(catalog);
        state.recover(seen).await;
        catalog = state.catalog.read().await;
    }

    // Render and cache under the read guard so a concurrent reload cannot
    // invalidate the cache between the two.
    let page = render::render_listing(&catalog, &view, &state.render_options)?;
    if !catalog.is_failed() {
        state.cache.insert(cache_key, page.clone()).await;
    }
    drop(catalog);

    Ok(Html(page))
}

#[cfg(feature = "api")]
async fn program_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let catalog = state.current().await;

    match catalog.catalog().and_then(|c| c.get(&id)) {
        Some(record) => {
            let page = render::render_detail(record, &state.render_options)?;
            Ok(Html(page).into_response())
        }
        None => {
            tracing::debug!("Unknown program id '{}'", id);
            let page = render::render_not_found(&id, &state.render_options)?;
            Ok((StatusCode::NOT_FOUND, Html(page)).into_response())
        }
    }
}

#[cfg(feature = "api")]
async fn api_programs(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = state.current().await;
    let Some(records) = catalog.catalog().map(|c| c.records()) else {
        return Err(AppError::Unavailable(
            "Program catalog is unavailable; POST /api/catalog/reload to retry".to_string(),
        ));
    };

    let view = ViewState::from_query(query.as_deref().unwrap_or(""));
    let visible = view.apply(records);

    Ok(Json(serde_json::json!({
        "rows": visible.len(),
        "query": view.to_query(),
        "data": visible
    })))
}

#[cfg(feature = "api")]
async fn reload_catalog(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let catalog = state.reload().await;

    if let CatalogState::Failed { reason } = catalog.as_ref() {
        return Err(AppError::Unavailable(reason.clone()));
    }

    let failures: Vec<serde_json::Value> = catalog
        .failures()
        .iter()
        .map(|f| {
            serde_json::json!({
                "source": f.source_id,
                "error": f.error.to_string()
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "programs": catalog.catalog().map(|c| c.len()).unwrap_or(0),
        "failures": failures
    })))
}

// ============================================================================
// Error Handling
// ============================================================================

#[cfg(feature = "api")]
#[derive(Debug)]
pub enum AppError {
    Render(String),
    Unavailable(String),
}

#[cfg(feature = "api")]
impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        AppError::Render(err.to_string())
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Render(msg) => {
                tracing::error!("Render failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
