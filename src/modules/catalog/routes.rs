use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use libris_db::SqliteStore;
use libris_http::AppError;
use serde_json::{json, Value};

use super::models::{Author, Book, BookFilter, ResetSummary};
use super::seed::SeedSource;
use super::service::{CatalogError, CatalogService};

/// Shared handler state
#[derive(Clone)]
pub struct CatalogState {
    pub service: CatalogService<SqliteStore>,
    pub seed: SeedSource,
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/books", post(upsert_book).get(list_books))
        .route("/books/{id}", get(get_book))
        .route("/authors", post(upsert_author).get(list_authors))
        .route("/authors/{id}", get(get_author))
        .route("/reset_data", post(reset_data))
        .route("/health", get(health_check))
        .with_state(state)
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(err) => {
                let message = err.to_string();
                AppError::validation(err.details(), message)
            }
            CatalogError::NotFound { .. } => AppError::not_found(err.to_string()),
            CatalogError::Storage(err) if !err.is_storage_failure() => {
                AppError::validation(Vec::new(), err.to_string())
            }
            CatalogError::Storage(err) => AppError::Internal(err.into()),
        }
    }
}

fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

async fn health_check() -> &'static str {
    "catalog module is healthy"
}

async fn upsert_book(
    State(state): State<CatalogState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Book>, AppError> {
    let payload = json_body(payload)?;
    Ok(Json(state.service.upsert_book(&payload)?))
}

async fn list_books(
    State(state): State<CatalogState>,
    filter: Result<Query<BookFilter>, QueryRejection>,
) -> Result<Json<Vec<Book>>, AppError> {
    let Query(filter) = filter.map_err(|rejection| {
        AppError::validation(
            vec![json!({"field": "query", "error": rejection.body_text()})],
            "invalid book filter",
        )
    })?;
    Ok(Json(state.service.list_books(&filter)?))
}

async fn get_book(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(state.service.get_book(&id)?))
}

async fn upsert_author(
    State(state): State<CatalogState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Author>, AppError> {
    let payload = json_body(payload)?;
    Ok(Json(state.service.upsert_author(&payload)?))
}

async fn list_authors(State(state): State<CatalogState>) -> Result<Json<Vec<Author>>, AppError> {
    Ok(Json(state.service.list_authors()?))
}

async fn get_author(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<Author>, AppError> {
    Ok(Json(state.service.get_author(&id)?))
}

async fn reset_data(State(state): State<CatalogState>) -> Result<Json<ResetSummary>, AppError> {
    let seed = state.seed.load()?;
    Ok(Json(state.service.reset_all(&seed.books, &seed.authors)?))
}
