//! Route definitions for user configuration documents, registered under
//! `/configs`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::configs;
use crate::state::AppState;

/// ```text
/// GET    /                            list_configs
/// POST   /                            create_config
/// GET    /{id}                        get_config
/// PUT    /{id}                        update_config
/// DELETE /{id}                        delete_config
/// GET    /{id}/versions               list_versions
/// GET    /{id}/versions/{version_id}  get_version
/// POST   /{id}/restore/{version_id}   restore_version
/// GET    /{id}/export                 export_config
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(configs::list_configs).post(configs::create_config))
        .route(
            "/{id}",
            get(configs::get_config)
                .put(configs::update_config)
                .delete(configs::delete_config),
        )
        .route("/{id}/versions", get(configs::list_versions))
        .route("/{id}/versions/{version_id}", get(configs::get_version))
        .route("/{id}/restore/{version_id}", post(configs::restore_version))
        .route("/{id}/export", get(configs::export_config))
}
