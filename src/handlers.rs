use crate::{
    AppState,
    auth::{
        self, CALLBACK_URL_COOKIE, CurrentIdentity, CurrentSession, RequireIdentity,
        SECURE_SESSION_COOKIE, SESSION_COOKIE, STATE_COOKIE,
    },
    config::{AppConfig, SessionStrategy},
    models::{
        AdminOverview, CallbackQuery, CapabilityResponse, MeResponse, NavigationQuery,
        NavigationResponse, Session,
    },
    navigation,
    roles::{self, Capability},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

// --- Auth Endpoints (exempt from the route guard) ---

/// get_session
///
/// [Public Route] The caller's session in the shape the frontend session hook expects.
/// Anonymous callers receive `{}`.
#[utoipa::path(
    get,
    path = "/api/auth/session",
    responses((status = 200, description = "Current session", body = Session))
)]
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<Session> {
    Json(session)
}

/// sign_in_google
///
/// [Public Route] Starts the Google sign-in by redirecting to the provider's
/// authorization endpoint. The code exchange happens in the OAuth callback,
/// outside this service.
///
/// `state` is a fresh random nonce, also set in the `authjs.state` cookie; the
/// callback must find both equal before exchanging the code. The post-login
/// destination travels in the `authjs.callback-url` cookie.
#[utoipa::path(
    get,
    path = "/api/auth/signin/google",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Redirect to Google"),
        (status = 503, description = "Google sign-in not configured")
    )
)]
pub async fn sign_in_google(
    State(config): State<AppConfig>,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), StatusCode> {
    if config.google_client_id.is_empty() {
        tracing::warn!("google sign-in requested but AUTH_GOOGLE_ID is not set");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let redirect_uri = format!(
        "{}/api/auth/callback/google",
        config.base_url.trim_end_matches('/')
    );
    let callback = safe_callback(query.callback_url.as_deref());
    let nonce = Uuid::new_v4().simple().to_string();

    let url = format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}",
        GOOGLE_AUTHORIZE_URL,
        urlencoding::encode(&config.google_client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode("openid email profile"),
        nonce,
    );

    let secure = config.base_url.starts_with("https://");
    let jar = CookieJar::new()
        .add(round_trip_cookie(STATE_COOKIE, nonce, secure))
        .add(round_trip_cookie(
            CALLBACK_URL_COOKIE,
            urlencoding::encode(&callback).into_owned(),
            secure,
        ));

    Ok((jar, Redirect::to(&url)))
}

fn round_trip_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// sign_out
///
/// [Public Route] Revokes the database session (if any), clears both session
/// cookies and sends the browser to `callbackUrl` (default `/`).
///
/// Cross-site submissions are refused: a request carrying an `Origin` other
/// than `AUTH_URL` gets 403 and keeps its session.
#[utoipa::path(
    post,
    path = "/api/auth/signout",
    params(CallbackQuery),
    responses(
        (status = 303, description = "Signed out"),
        (status = 403, description = "Cross-site request")
    )
)]
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Result<(CookieJar, Redirect), StatusCode> {
    if !same_origin(&headers, &state.config.base_url) {
        tracing::warn!("sign_out refused: foreign Origin header");
        return Err(StatusCode::FORBIDDEN);
    }

    if state.config.session_strategy == SessionStrategy::Database {
        if let Some(token) = auth::session_token(&headers) {
            if let Err(e) = state.repo.delete_session(&token).await {
                tracing::error!("sign_out error: {}", e);
            }
        }
    }

    // Removal cookies are only emitted for cookies the request actually carried.
    // Browsers drop `__Secure-` cookies that lack the Secure attribute.
    let jar = CookieJar::from_headers(&headers)
        .remove(Cookie::build(SESSION_COOKIE).path("/"))
        .remove(Cookie::build(SECURE_SESSION_COOKIE).path("/").secure(true));

    Ok((jar, Redirect::to(&safe_callback(query.callback_url.as_deref()))))
}

/// Requests without an `Origin` header come from non-browser clients and pass.
fn same_origin(headers: &HeaderMap, base_url: &str) -> bool {
    match headers.get(header::ORIGIN).map(|value| value.to_str()) {
        None => true,
        Some(Ok(origin)) => origin.trim_end_matches('/') == base_url.trim_end_matches('/'),
        Some(Err(_)) => false,
    }
}

// --- Navigation ---

/// get_navigation
///
/// [Public Route] Header state for the page at `path`: the annotated
/// navigation tree and the role-gated user menu.
#[utoipa::path(
    get,
    path = "/api/navigation",
    params(NavigationQuery),
    responses((status = 200, description = "Header menu", body = NavigationResponse))
)]
pub async fn get_navigation(
    CurrentIdentity(identity): CurrentIdentity,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationResponse> {
    let path = query.path.as_deref().unwrap_or("/");
    let menu = navigation::compute_menu(identity.as_ref(), path);

    Json(NavigationResponse {
        header_visible: navigation::header_visible(path),
        items: menu.items,
        user_menu: menu.user_menu,
    })
}

/// get_me
///
/// [Authenticated Route] The caller's identity and the administration sections it may open.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Identity", body = MeResponse),
        (status = 401, description = "No session")
    )
)]
pub async fn get_me(RequireIdentity(identity): RequireIdentity) -> Json<MeResponse> {
    let capabilities = roles::accessible_capabilities(identity.role);
    Json(MeResponse {
        identity,
        capabilities,
    })
}

// --- Administration ---

/// get_admin_overview
///
/// [Admin Route] The administration sidebar.
///
/// *Authorization*: the caller must hold a role of the admin set.
#[utoipa::path(
    get,
    path = "/admin",
    responses(
        (status = 200, description = "Sidebar", body = AdminOverview),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn get_admin_overview(
    RequireIdentity(identity): RequireIdentity,
) -> Result<Json<AdminOverview>, StatusCode> {
    match identity.role.filter(|_| identity.is_admin) {
        Some(role) => Ok(Json(AdminOverview {
            role,
            sidebar: roles::accessible_capabilities(Some(role)),
        })),
        None => Err(StatusCode::FORBIDDEN),
    }
}

/// get_admin_section
///
/// [Admin Route] Opens one administration section.
///
/// *Authorization*: the caller's role must be listed for the capability in the
/// permission table. Unknown section names are 404.
#[utoipa::path(
    get,
    path = "/admin/{capability}",
    params(("capability" = String, Path, description = "Section name, e.g. `matches`")),
    responses(
        (status = 200, description = "Section", body = CapabilityResponse),
        (status = 403, description = "Role not permitted"),
        (status = 404, description = "Unknown section")
    )
)]
pub async fn get_admin_section(
    RequireIdentity(identity): RequireIdentity,
    Path(name): Path<String>,
) -> Result<Json<CapabilityResponse>, StatusCode> {
    let capability = Capability::parse(&name).ok_or(StatusCode::NOT_FOUND)?;

    let permitted = identity.role.is_some_and(|role| capability.permits(role));
    if !permitted {
        tracing::info!(user_id = %identity.id, capability = capability.as_str(), "section denied");
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(Json(CapabilityResponse {
        capability,
        permitted_roles: capability.permitted_roles().to_vec(),
    }))
}

/// safe_callback
///
/// Keeps post-auth redirects on this site: only relative paths are accepted,
/// anything else falls back to `/`.
pub fn safe_callback(callback: Option<&str>) -> String {
    match callback {
        Some(url) if url.starts_with('/') && !url.starts_with("//") && !url.contains('\\') => {
            url.to_string()
        }
        _ => "/".to_string(),
    }
}
