//! Handlers for configuration import tracking.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use conflux_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{DataResponse, ListResponse};
use crate::service::{CreateImportRequest, UpdateImportRequest};
use crate::state::AppState;

/// POST /imports
pub async fn create_import(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateImportRequest>,
) -> AppResult<impl IntoResponse> {
    let import = state.service.create_import(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: import })))
}

/// GET /imports
pub async fn list_imports(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .service
        .list_imports(auth.user_id, params.page, params.limit)
        .await?;
    Ok(Json(ListResponse {
        data: page.items,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// GET /imports/{id}
pub async fn get_import(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let import = state.service.get_import(auth.user_id, id).await?;
    Ok(Json(DataResponse { data: import }))
}

/// PUT /imports/{id}/status
pub async fn update_import_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateImportRequest>,
) -> AppResult<impl IntoResponse> {
    let import = state
        .service
        .update_import_status(auth.user_id, id, input)
        .await?;
    Ok(Json(DataResponse { data: import }))
}
