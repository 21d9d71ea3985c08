use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    auth::{self, ResolvedSession, SIGN_IN_PATH},
    navigation::is_under,
};

/// PathPattern
///
/// An exemption from the authentication challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches one path exactly.
    Exact(&'static str),
    /// Matches a path and everything below it (`/public` covers `/public/logo.png`).
    Prefix(&'static str),
}

impl PathPattern {
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(p) => path == *p,
            PathPattern::Prefix(p) => is_under(path, p),
        }
    }
}

/// Paths that never require a session: build assets, the image optimizer,
/// the favicon, the auth callbacks, the public assets directory, the health
/// probe, the sign-in page itself and the header navigation (anonymous callers
/// get the signed-out menu).
pub const PUBLIC_PATHS: &[PathPattern] = &[
    PathPattern::Prefix("/_next/static"),
    PathPattern::Prefix("/_next/image"),
    PathPattern::Exact("/favicon.ico"),
    PathPattern::Prefix("/api/auth"),
    PathPattern::Prefix("/public"),
    PathPattern::Exact("/health"),
    PathPattern::Exact(SIGN_IN_PATH),
    PathPattern::Exact("/api/navigation"),
];

/// RouteDecision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Pass,
    /// Send the visitor to `redirect_to`, which carries the original destination.
    Challenge { redirect_to: String },
}

/// is_public_path
///
/// Checks the exemption list in order.
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|pattern| pattern.matches(path))
}

/// evaluate
///
/// The guard's decision for a request. `destination` is the original path and
/// query; `has_session` is whether a valid session was found. Exempt paths pass
/// even without a session. Roles play no part here.
pub fn evaluate(destination: &str, has_session: bool) -> RouteDecision {
    let path = destination.split('?').next().unwrap_or(destination);
    if is_public_path(path) || has_session {
        RouteDecision::Pass
    } else {
        RouteDecision::Challenge {
            redirect_to: sign_in_redirect(destination),
        }
    }
}

/// `{SIGN_IN_PATH}?callbackUrl={destination}` with the destination URL-encoded.
pub fn sign_in_redirect(destination: &str) -> String {
    format!(
        "{}?callbackUrl={}",
        SIGN_IN_PATH,
        urlencoding::encode(destination)
    )
}

/// route_guard
///
/// Outermost access gate, applied to every route. Exempt paths skip the session
/// lookup entirely. Otherwise the session is loaded once and attached to the
/// request as [`ResolvedSession`] for the handlers; anonymous callers are redirected
/// to sign in.
pub async fn route_guard(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let uri = request.uri();
    let destination = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    if is_public_path(uri.path()) {
        return next.run(request).await;
    }

    let session = auth::load_session(request.headers(), &state.repo, &state.config).await;

    match evaluate(&destination, session.is_authenticated()) {
        RouteDecision::Pass => {
            request.extensions_mut().insert(ResolvedSession(session));
            next.run(request).await
        }
        RouteDecision::Challenge { redirect_to } => {
            tracing::debug!(%destination, "no session, redirecting to sign-in");
            Redirect::to(&redirect_to).into_response()
        }
    }
}
