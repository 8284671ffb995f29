use crate::models::RecentEntry;
use crate::store::{Snapshot, Tracker};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Local};
use serde::Serialize;

/// Entries included in the dashboard summary
pub const SUMMARY_LIMIT: usize = 50;

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub snapshot: Snapshot,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time: DateTime<Local>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Read-only routes over the tracker
pub fn router(tracker: Tracker) -> Router {
    Router::new()
        .route("/", get(summary))
        .route("/health", get(health))
        .route("/item/:id", get(item))
        .with_state(tracker)
}

async fn summary(State(tracker): State<Tracker>) -> Json<SummaryResponse> {
    Json(SummaryResponse {
        status: "ok",
        snapshot: tracker.snapshot(SUMMARY_LIMIT).await,
    })
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "up",
        time: Local::now(),
    })
}

async fn item(
    State(tracker): State<Tracker>,
    Path(id): Path<String>,
) -> Result<Json<RecentEntry>, (StatusCode, Json<ErrorBody>)> {
    tracker.lookup(&id).await.map(Json).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "not found".to_string(),
            }),
        )
    })
}
