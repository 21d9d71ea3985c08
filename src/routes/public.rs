use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints the route guard lets through without a session: the health probe,
/// the header navigation and the `/api/auth` surface used by the sign-in flow.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // GET /api/navigation?path=/equipes
        // Header state for a page: active navigation entries and the user menu.
        // Anonymous callers get the signed-out menu.
        .route("/api/navigation", get(handlers::get_navigation))
        // GET /api/auth/session
        // The current session, `{}` when signed out.
        .route("/api/auth/session", get(handlers::get_session))
        // GET /api/auth/signin/google?callbackUrl=...
        // Redirects to Google's authorization endpoint.
        .route("/api/auth/signin/google", get(handlers::sign_in_google))
        // POST /api/auth/signout?callbackUrl=...
        // Revokes the session and clears the session cookies.
        .route("/api/auth/signout", post(handlers::sign_out))
}
