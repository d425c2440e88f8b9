//! HTTP routes
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET  | `/health` | liveness |
//! | GET  | `/levels` | levels with entry counts |
//! | POST | `/results/:level_id` | submit, JSON body `{"name", "time"}` |
//! | POST | `/results/:level_id/:name/:time` | submit, path-encoded |
//! | GET  | `/results/:level_id?limit=n` | fastest entries |
//! | GET  | `/log_result/:level_id/:name/:time[/:checksum]` | legacy submit |
//! | GET  | `/get_result/:level_id` | legacy query |
//!
//! The store is synchronous, so every handler hands its work to
//! `spawn_blocking` and keeps the async workers free.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ServiceError;
use crate::service::{LevelSummary, ResultService, ScoreView};

/// Acknowledgement body for accepted submissions
pub const ACK: &str = "ok";
/// Acknowledgement body for the legacy submit route
pub const LEGACY_ACK: &str = "success";

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving
    pub status: String,
    /// Active storage backend
    pub backend: String,
}

/// Submission body for `POST /results/:level_id`
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitBody {
    /// Player name
    pub name: String,
    /// Seconds, either as a JSON number or a decimal string
    pub time: TimeField,
}

/// Time as sent by clients
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TimeField {
    /// `"time": 12.5`
    Seconds(f64),
    /// `"time": "12.5"`
    Text(String),
}

/// Query string for `GET /results/:level_id`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopParams {
    /// Number of entries to return
    pub limit: Option<usize>,
}

/// Build the router
pub fn router(service: ResultService) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/levels", get(list_levels))
        .route("/results/:level_id", get(get_results).post(post_result))
        .route("/results/:level_id/:name/:time", post(post_result_path))
        // Routes the shipped game client calls
        .route("/log_result/:level_id/:name/:time", get(log_result))
        .route(
            "/log_result/:level_id/:name/:time/:checksum",
            get(log_result_signed),
        )
        .route("/get_result/:level_id", get(get_result))
        .with_state(service)
}

async fn blocking<T, F>(f: F) -> Result<T, ServiceError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(ServiceError::internal)?
}

/// Path parameters, or a 400 with the usual error body if a segment does not decode
fn path_params<T>(path: Result<Path<T>, PathRejection>) -> Result<T, ServiceError> {
    path.map(|Path(params)| params)
        .map_err(|rejection| ServiceError::bad_request(rejection.body_text()))
}

async fn health(State(service): State<ResultService>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: service.backend_name().to_string(),
    })
}

async fn list_levels(
    State(service): State<ResultService>,
) -> Result<Json<Vec<LevelSummary>>, ServiceError> {
    let levels = blocking(move || service.levels()).await?;
    Ok(Json(levels))
}

async fn post_result(
    State(service): State<ResultService>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<SubmitBody>, JsonRejection>,
) -> Result<Json<&'static str>, ServiceError> {
    let level_id = path_params(path)?;
    let Json(body) = body.map_err(|rejection| ServiceError::bad_request(rejection.body_text()))?;
    blocking(move || match body.time {
        TimeField::Seconds(time) => service.submit_time(&level_id, &body.name, time),
        TimeField::Text(raw) => service.submit(&level_id, &body.name, &raw),
    })
    .await?;
    Ok(Json(ACK))
}

async fn post_result_path(
    State(service): State<ResultService>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> Result<Json<&'static str>, ServiceError> {
    let (level_id, name, time) = path_params(path)?;
    blocking(move || service.submit(&level_id, &name, &time)).await?;
    Ok(Json(ACK))
}

async fn get_results(
    State(service): State<ResultService>,
    path: Result<Path<String>, PathRejection>,
    params: Result<Query<TopParams>, QueryRejection>,
) -> Result<Json<Vec<ScoreView>>, ServiceError> {
    let level_id = path_params(path)?;
    let Query(params) =
        params.map_err(|rejection| ServiceError::bad_request(rejection.body_text()))?;
    let scores = blocking(move || service.query(&level_id, params.limit)).await?;
    Ok(Json(scores))
}

async fn log_result(
    State(service): State<ResultService>,
    path: Result<Path<(String, String, String)>, PathRejection>,
) -> Result<&'static str, ServiceError> {
    let (level_id, name, time) = path_params(path)?;
    blocking(move || service.submit(&level_id, &name, &time)).await?;
    Ok(LEGACY_ACK)
}

async fn log_result_signed(
    State(service): State<ResultService>,
    path: Result<Path<(String, String, String, String)>, PathRejection>,
) -> Result<&'static str, ServiceError> {
    let (level_id, name, time, _checksum) = path_params(path)?;
    // The checksum is not verified
    blocking(move || service.submit(&level_id, &name, &time)).await?;
    Ok(LEGACY_ACK)
}

async fn get_result(
    State(service): State<ResultService>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<ScoreView>>, ServiceError> {
    let level_id = path_params(path)?;
    let scores = blocking(move || service.query(&level_id, None)).await?;
    Ok(Json(scores))
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    router: Router,
    shutdown: F,
) -> std::io::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(target: "scorekeep::http", %addr, "Listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}
