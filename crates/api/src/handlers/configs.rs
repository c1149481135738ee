//! Handlers for user configuration documents: CRUD, version history,
//! restore, and export.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use conflux_core::format::ConfigFormat;
use conflux_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::response::{DataResponse, ListResponse};
use crate::service::{CreateConfigRequest, UpdateConfigRequest};
use crate::state::AppState;

#[derive(Debug, serde::Deserialize)]
pub struct ExportParams {
    pub format: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ListConfigsParams {
    pub template_id: Option<DbId>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /configs
///
/// Create a document from a template (`template_id`) or from raw content.
pub async fn create_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateConfigRequest>,
) -> AppResult<impl IntoResponse> {
    let config = state.service.create_config(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: config })))
}

/// GET /configs
///
/// Optional `?template_id=` restricts the list to documents created from
/// that template.
pub async fn list_configs(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListConfigsParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .service
        .list_configs(auth.user_id, params.template_id, params.page, params.limit)
        .await?;
    Ok(Json(ListResponse {
        data: page.items,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// GET /configs/{id}
pub async fn get_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let config = state.service.get_config(auth.user_id, id).await?;
    Ok(Json(DataResponse { data: config }))
}

/// PUT /configs/{id}
///
/// Content changes are validated under the stored format and append a
/// version snapshot.
pub async fn update_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateConfigRequest>,
) -> AppResult<impl IntoResponse> {
    let config = state.service.update_config(auth.user_id, id, input).await?;
    Ok(Json(DataResponse { data: config }))
}

/// DELETE /configs/{id}
pub async fn delete_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.service.delete_config(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /configs/{id}/versions
pub async fn list_versions(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<PageParams>,
) -> AppResult<impl IntoResponse> {
    let page = state
        .service
        .list_versions(auth.user_id, id, params.page, params.limit)
        .await?;
    Ok(Json(ListResponse {
        data: page.items,
        total: page.total,
        page: page.page,
        limit: page.limit,
    }))
}

/// GET /configs/{id}/versions/{version_id}
pub async fn get_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let version = state
        .service
        .get_version(auth.user_id, id, version_id)
        .await?;
    Ok(Json(DataResponse { data: version }))
}

/// POST /configs/{id}/restore/{version_id}
pub async fn restore_version(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((id, version_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let config = state
        .service
        .restore_version(auth.user_id, id, version_id)
        .await?;
    Ok(Json(DataResponse { data: config }))
}

/// GET /configs/{id}/export?format=
///
/// Download the document, converted when a different format is requested.
pub async fn export_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let export = state
        .service
        .export_config(auth.user_id, id, params.format.as_deref())
        .await?;

    let headers = [
        (header::CONTENT_TYPE, content_type(export.format).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
    ];
    Ok((headers, export.content))
}

fn content_type(format: ConfigFormat) -> &'static str {
    match format {
        ConfigFormat::Json => "application/json",
        ConfigFormat::Yaml => "application/x-yaml",
        ConfigFormat::Toml => "application/toml",
        ConfigFormat::Env => "text/plain",
    }
}
