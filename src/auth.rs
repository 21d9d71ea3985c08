use std::convert::Infallible;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{
    config::{AppConfig, Env, SessionStrategy},
    error::SessionError,
    models::{Session, SessionUser},
    repository::RepositoryState,
    session::{Identity, resolve_identity},
};

/// Session cookie set by the OAuth flow over plain HTTP.
pub const SESSION_COOKIE: &str = "authjs.session-token";
/// Session cookie set by the OAuth flow over HTTPS.
pub const SECURE_SESSION_COOKIE: &str = "__Secure-authjs.session-token";
/// Anti-forgery nonce for the OAuth round trip, echoed back in `state`.
pub const STATE_COOKIE: &str = "authjs.state";
/// Post-login destination kept across the OAuth round trip.
pub const CALLBACK_URL_COOKIE: &str = "authjs.callback-url";
/// Where unauthenticated visitors are sent to sign in.
pub const SIGN_IN_PATH: &str = "/auth/signin";
/// Local-only header naming a user id to impersonate.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// Payload of a session JWT (`jwt` strategy).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user id.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: usize,
    pub exp: usize,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        SessionUser {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            image: claims.picture,
            role: claims.role,
        }
    }
}

/// session_token
///
/// Finds the session token on a request: the session cookie first (either
/// name), then an `Authorization: Bearer` header. The scheme name is matched
/// case-insensitively.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    let from_cookie = jar
        .get(SESSION_COOKIE)
        .or_else(|| jar.get(SECURE_SESSION_COOKIE))
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    from_cookie.or_else(|| {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split_once(' '))
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
            .map(|(_, token)| token.trim())
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    })
}

/// decode_session_token
///
/// Verifies a session JWT (HS256, expiry enforced) and returns the session it carries.
pub fn decode_session_token(token: &str, secret: &str) -> Result<Session, SessionError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &decoding_key, &validation)?;
    let expires = chrono::DateTime::from_timestamp(data.claims.exp as i64, 0);

    Ok(Session {
        user: Some(data.claims.into()),
        expires,
    })
}

/// load_session
///
/// Resolves the raw session of a request through the configured strategy.
///
/// Never fails: a missing token, a rejected token, an unknown user or a
/// lookup error all produce the anonymous session. Failures are logged at `warn`.
pub async fn load_session(headers: &HeaderMap, repo: &RepositoryState, config: &AppConfig) -> Session {
    match try_load_session(headers, repo, config).await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("session resolution failed, continuing as anonymous: {}", e);
            Session::anonymous()
        }
    }
}

async fn try_load_session(
    headers: &HeaderMap,
    repo: &RepositoryState,
    config: &AppConfig,
) -> Result<Session, SessionError> {
    // Local development bypass, never honoured in production.
    if config.env == Env::Local {
        if let Some(user_id) = headers.get(DEV_USER_HEADER).and_then(|v| v.to_str().ok()) {
            if let Some(user) = repo.find_user(user_id).await? {
                tracing::debug!(user_id, "local bypass session");
                return Ok(Session {
                    user: Some(user.into()),
                    expires: None,
                });
            }
        }
    }

    let Some(token) = session_token(headers) else {
        return Ok(Session::anonymous());
    };

    match config.session_strategy {
        SessionStrategy::Database => Ok(repo
            .find_session(&token)
            .await?
            .map(Session::from)
            .unwrap_or_default()),
        SessionStrategy::Jwt => decode_session_token(&token, &config.auth_secret),
    }
}

/// ResolvedSession
///
/// Request extension written by the route guard once it has loaded the session,
/// so extractors further down the same request do not query again.
#[derive(Debug, Clone)]
pub struct ResolvedSession(pub Session);

async fn session_from_parts<S>(parts: &Parts, state: &S) -> Session
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    if let Some(ResolvedSession(session)) = parts.extensions.get::<ResolvedSession>() {
        return session.clone();
    }
    let repo = RepositoryState::from_ref(state);
    let config = AppConfig::from_ref(state);
    load_session(&parts.headers, &repo, &config).await
}

/// CurrentSession
///
/// Extracts the raw session of the request. Never rejects.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentSession(session_from_parts(parts, state).await))
    }
}

/// CurrentIdentity
///
/// Extracts the caller's [`Identity`], `None` for anonymous visitors. Never rejects,
/// so handlers can always fall back to the signed-out view.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await;
        Ok(CurrentIdentity(resolve_identity(&session)))
    }
}

/// RequireIdentity
///
/// Like [`CurrentIdentity`] but rejects anonymous callers with 401.
#[derive(Debug, Clone)]
pub struct RequireIdentity(pub Identity);

impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await;
        resolve_identity(&session)
            .map(RequireIdentity)
            .ok_or(StatusCode::UNAUTHORIZED)
    }
}
