use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes for signed-in visitors. The route guard has already redirected
/// anonymous callers and attached the resolved session to the request.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/me
        // The caller's identity and accessible administration sections.
        .route("/api/me", get(handlers::get_me))
}
