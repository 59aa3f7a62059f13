// handlers.rs
use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path, State,
    },
    Json,
};
use http::StatusCode;
use tracing::info;

use crate::error::AppError;
use crate::models::{CategoryResponse, MessageResponse};
use crate::routes::AppState;
use crate::schema::{self, ValidationFailure};

/// Resolves the `{id}` segment. A non-integer id matches no category.
fn category_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::NotFound(rejection.body_text()))
}

/// Buffers the body. Oversized or broken bodies are reported as validation
/// failures rather than axum's plain-text rejection.
fn request_body(body: Result<Bytes, BytesRejection>) -> Result<Bytes, AppError> {
    body.map_err(|rejection| ValidationFailure::Unreadable(rejection.body_text()).into())
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), AppError> {
    let body = request_body(body)?;
    let raw = schema::parse_body(&body)?;
    let request = schema::validate_create(&raw)?;

    let mut tx = state.store.begin().await?;
    let category = tx.create(&request.name).await?;
    tx.commit().await?;

    info!(id = category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// List every category, oldest id first
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let unexpected = |e: crate::store::StoreError| AppError::Unexpected(e.to_string());

    let mut tx = state.store.begin().await.map_err(unexpected)?;
    let categories = tx.list_all().await.map_err(unexpected)?;
    tx.commit().await.map_err(unexpected)?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from).collect()))
}

/// Fetch a single category
pub async fn get_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<CategoryResponse>, AppError> {
    let id = category_id(path)?;

    let mut tx = state.store.begin().await?;
    let category = tx.get(id).await?;
    tx.commit().await?;

    Ok(Json(category.into()))
}

/// Delete a category, detaching its polls first
pub async fn delete_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = category_id(path)?;

    let mut tx = state.store.begin().await?;
    let detached = tx.delete(id).await?;
    tx.commit().await?;

    info!(id, detached_polls = detached, "category deleted");
    Ok(Json(MessageResponse {
        message: format!("Category with ID {id} was deleted successfully."),
    }))
}

/// Rename a category. Existence is checked before the body is validated.
pub async fn update_category(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<CategoryResponse>, AppError> {
    let id = category_id(path)?;

    let mut tx = state.store.begin().await?;
    tx.get(id).await?;

    let body = request_body(body)?;
    let raw = schema::parse_body(&body)?;
    let request = schema::validate_update(&raw)?;

    let category = tx.update(id, &request.name).await?;
    tx.commit().await?;

    info!(id, name = %category.name, "category updated");
    Ok(Json(category.into()))
}
