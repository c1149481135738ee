//! Route definitions for template management, registered under `/templates`.

use axum::routing::get;
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// ```text
/// GET    /      list_templates
/// POST   /      create_template (admin)
/// GET    /{id}  get_template
/// PUT    /{id}  update_template (admin)
/// DELETE /{id}  delete_template (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route(
            "/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
}
