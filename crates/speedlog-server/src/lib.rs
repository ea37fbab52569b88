//! HTTP surface for speedlog.
//!
//! Serves the engine's analytics as JSON for dashboards and scripts. Every
//! request re-reads the log on a blocking worker thread; the server holds no
//! state besides the store's path.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, Json},
    routing::get,
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use speedlog_core::{
    DEFAULT_WINDOW_DAYS, LogConfig, LogError, LogStore, Record, StatsSnapshot, WindowedSeries,
};

/// Where to listen and which log to serve.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Window used by `/series` when the request gives none.
    pub window_days: u32,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            window_days: DEFAULT_WINDOW_DAYS,
            log: LogConfig::default(),
        }
    }
}

/// Shared server state.
struct AppState {
    store: LogStore,
    window_days: u32,
}

#[derive(Deserialize)]
struct SeriesParams {
    /// Trailing window in days.
    days: Option<u32>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(status: StatusCode, msg: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: msg.into() }))
}

/// Run an engine query off the async runtime. `None` becomes 404 with
/// `missing` as the message, an I/O failure becomes 500.
async fn run_query<T, F>(query: F, missing: &str) -> ApiResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<Option<T>, LogError> + Send + 'static,
{
    match tokio::task::spawn_blocking(query).await {
        Ok(Ok(Some(value))) => Ok(Json(value)),
        Ok(Ok(None)) => Err(error_response(StatusCode::NOT_FOUND, missing)),
        Ok(Err(e)) => {
            log::error!("query failed: {e}");
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            log::error!("query task failed: {e}");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ))
        }
    }
}

async fn handle_stats(State(state): State<Arc<AppState>>) -> ApiResult<StatsSnapshot> {
    let store = state.store.clone();
    run_query(
        move || store.stats(),
        "No stats found or log file is empty/missing.",
    )
    .await
}

async fn handle_latest(State(state): State<Arc<AppState>>) -> ApiResult<Record> {
    let store = state.store.clone();
    run_query(
        move || store.latest(),
        "No measurement found or log file is empty/missing.",
    )
    .await
}

async fn handle_series(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeriesParams>,
) -> ApiResult<WindowedSeries> {
    let store = state.store.clone();
    let days = params.days.unwrap_or(state.window_days);
    let missing = format!("No measurements in the last {days} days.");
    run_query(
        move || store.series(days, Local::now().naive_local()),
        &missing,
    )
    .await
}

async fn handle_index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(format!(
        r#"<html>
<head><title>Speedlog Server</title></head>
<body>
    <h1>Speedlog v{version}</h1>
    <p>Internet speed statistics:</p>
    <ul>
        <li><a href="/stats">All-time statistics (JSON)</a></li>
        <li><a href="/latest">Most recent measurement (JSON)</a></li>
        <li><a href="/series">Speed history, last {days} days (JSON)</a></li>
    </ul>
</body>
</html>
"#,
        version = speedlog_core::VERSION,
        days = state.window_days,
    ))
}

/// Build the axum router.
fn build_router(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        store: LogStore::from_config(&config.log),
        window_days: config.window_days,
    });

    Router::new()
        .route("/", get(handle_index))
        .route("/stats", get(handle_stats))
        .route("/latest", get(handle_latest))
        .route("/series", get(handle_series))
        .with_state(state)
}

/// Run the HTTP server until it fails.
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let app = build_router(&config);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!(
        "serving {} on http://{addr}",
        config.log.path.display()
    );
    axum::serve(listener, app).await
}
