use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::Local;
use leeslog_http::error::AppError;
use serde::Serialize;

use super::SharedService;
use crate::modules::books::{
    models::{BookDraft, BookForm, BookRecord, LookupQuery},
    stats::{ReadingStats, SkippedRecord},
};

pub fn router(service: SharedService) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{key}", delete(delete_book))
        .route("/lookup", get(lookup_book))
        .route("/stats", get(reading_stats))
        .route("/health", get(health_check))
        .with_state(service)
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub key: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: ReadingStats,
    pub skipped: Vec<SkippedRecord>,
}

async fn health_check() -> &'static str {
    "books module is healthy"
}

async fn list_books(State(service): State<SharedService>) -> Result<Json<Vec<BookRecord>>, AppError> {
    Ok(Json(service.list().await?))
}

async fn create_book(
    State(service): State<SharedService>,
    Json(form): Json<BookForm>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let key = service.add_form(form).await?;
    Ok((StatusCode::CREATED, Json(Created { key })))
}

async fn delete_book(
    State(service): State<SharedService>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    service.delete_key(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn lookup_book(
    State(service): State<SharedService>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<BookDraft>, AppError> {
    Ok(Json(service.lookup(&query.title).await?))
}

async fn reading_stats(State(service): State<SharedService>) -> Result<Json<StatsResponse>, AppError> {
    let dashboard = service.dashboard(Local::now().date_naive()).await?;
    Ok(Json(StatsResponse {
        stats: dashboard.stats,
        skipped: dashboard.skipped,
    }))
}
