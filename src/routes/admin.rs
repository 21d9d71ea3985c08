use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Nested under `/admin`. Every handler resolves the caller's role and checks it
/// against the permission table before answering: the admin set for the sidebar,
/// the capability's own row for a section.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin
        // Sidebar of the sections the caller's role may open.
        .route("/", get(handlers::get_admin_overview))
        // GET /admin/{capability}
        // One section (dashboard, matches, teams, ...), 403 when the role is not listed.
        .route("/{capability}", get(handlers::get_admin_section))
}
