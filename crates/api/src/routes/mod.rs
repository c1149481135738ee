pub mod configs;
pub mod formats;
pub mod health;
pub mod imports;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                          list, create (create: admin)
/// /templates/{id}                     get, update, delete (mutations: admin)
///
/// /configs                            list, create
/// /configs/{id}                       get, update, delete
/// /configs/{id}/versions              version history (newest first)
/// /configs/{id}/versions/{version_id} single version
/// /configs/{id}/restore/{version_id}  restore snapshot (POST)
/// /configs/{id}/export                download, optional ?format=
///
/// /formats/detect                     detect format (POST)
/// /formats/convert                    convert between formats (POST)
/// /formats/validate                   validation report (POST)
///
/// /imports                            list, create
/// /imports/{id}                       get
/// /imports/{id}/status                lifecycle transition (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", templates::router())
        .nest("/configs", configs::router())
        .nest("/formats", formats::router())
        .nest("/imports", imports::router())
}
