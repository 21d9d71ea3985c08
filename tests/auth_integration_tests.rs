mod common;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, header, request::Parts},
};
use club_portal::{
    auth::{
        Claims, CurrentIdentity, CurrentSession, RequireIdentity, ResolvedSession, session_token,
    },
    config::{AppConfig, Env, SessionStrategy},
    models::{Session, SessionUser},
    roles::Role,
};
use common::{MockSessionRepo, TEST_SECRET, app_state, app_state_with, seeded_repo, user};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::SystemTime;

// --- Helpers ---

fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn parts_with_header(name: header::HeaderName, value: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts
        .headers
        .insert(name, header::HeaderValue::from_str(value).unwrap());
    parts
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

fn create_token(role: &str, exp_offset: i64, secret: &str) -> String {
    let claims = Claims {
        sub: "jwt-user".to_string(),
        name: None,
        email: Some("arbitre@example.fr".to_string()),
        picture: None,
        role: Some(role.to_string()),
        iat: now() as usize,
        exp: (now() + exp_offset) as usize,
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

fn jwt_state() -> club_portal::AppState {
    let mut config = AppConfig::default();
    config.env = Env::Production;
    config.auth_secret = TEST_SECRET.to_string();
    config.session_strategy = SessionStrategy::Jwt;
    app_state_with(config, MockSessionRepo::default())
}

// --- Database strategy ---

#[tokio::test]
async fn test_session_cookie_resolves_identity() {
    let state = app_state(Env::Production, seeded_repo());
    let mut parts = parts_with_header(header::COOKIE, "theme=dark; authjs.session-token=tok-coach");

    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    let identity = identity.expect("coach session should resolve");
    assert_eq!(identity.id, "coach-1");
    assert_eq!(identity.role, Some(Role::Coach));
    assert!(identity.is_admin);
}

#[tokio::test]
async fn test_secure_cookie_and_bearer_are_accepted() {
    let state = app_state(Env::Production, seeded_repo());

    let mut parts = parts_with_header(header::COOKIE, "__Secure-authjs.session-token=tok-com");
    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(identity.unwrap().role, Some(Role::Com));

    let mut parts = parts_with_header(header::AUTHORIZATION, "Bearer tok-joueur");
    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    let identity = identity.unwrap();
    assert_eq!(identity.role, Some(Role::Joueur));
    assert!(!identity.is_admin);
}

#[test]
fn test_bearer_scheme_is_case_insensitive() {
    for value in ["bearer tok-joueur", "BEARER tok-joueur", "Bearer  tok-joueur"] {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        assert_eq!(session_token(&headers).as_deref(), Some("tok-joueur"), "{value}");
    }

    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert_eq!(session_token(&headers), None);
}

#[tokio::test]
async fn test_unknown_role_claim_is_not_admin() {
    let state = app_state(Env::Production, seeded_repo());
    let mut parts = parts_with_header(header::COOKIE, "authjs.session-token=tok-unknown");

    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    let identity = identity.unwrap();
    assert_eq!(identity.role, None);
    assert!(!identity.is_admin);
}

#[tokio::test]
async fn test_unknown_token_is_anonymous() {
    let state = app_state(Env::Production, seeded_repo());
    let mut parts = parts_with_header(header::COOKIE, "authjs.session-token=forged");

    let CurrentSession(session) = CurrentSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(session, Session::anonymous());
}

#[tokio::test]
async fn test_lookup_failure_is_anonymous() {
    let state = app_state(Env::Production, MockSessionRepo::failing());
    let mut parts = parts_with_header(header::COOKIE, "authjs.session-token=tok-coach");

    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert!(identity.is_none());
}

#[tokio::test]
async fn test_require_identity_rejects_anonymous() {
    let state = app_state(Env::Production, seeded_repo());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let result = RequireIdentity::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resolved_session_extension_skips_lookup() {
    // A failing repository proves the extension is used as-is.
    let state = app_state(Env::Production, MockSessionRepo::failing());
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.extensions.insert(ResolvedSession(Session {
        user: Some(SessionUser {
            id: "from-guard".to_string(),
            role: Some("bureau".to_string()),
            ..Default::default()
        }),
        expires: None,
    }));

    let RequireIdentity(identity) = RequireIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(identity.id, "from-guard");
    assert!(identity.is_admin);
}

// --- JWT strategy ---

#[tokio::test]
async fn test_valid_jwt_resolves_identity() {
    let state = jwt_state();
    let token = create_token("dev", 3600, TEST_SECRET);
    let mut parts = parts_with_header(header::COOKIE, &format!("authjs.session-token={token}"));

    let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    let identity = identity.unwrap();
    assert_eq!(identity.id, "jwt-user");
    assert_eq!(identity.name, "arbitre");
    assert_eq!(identity.role, Some(Role::Dev));
}

#[tokio::test]
async fn test_expired_or_forged_jwt_is_anonymous() {
    let state = jwt_state();

    for token in [
        create_token("admin", -3600, TEST_SECRET),
        create_token("admin", 3600, "another-secret"),
        "not-a-jwt".to_string(),
    ] {
        let mut parts = parts_with_header(header::AUTHORIZATION, &format!("Bearer {token}"));
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(identity.is_none());
    }
}

// --- Local bypass ---

#[tokio::test]
async fn test_local_bypass_success() {
    let mut repo = MockSessionRepo::default();
    repo.users.insert("dev-1".to_string(), user("dev-1", Some("admin")));
    let state = app_state(Env::Local, repo);

    let mut parts = parts_with_header(header::HeaderName::from_static("x-user-id"), "dev-1");

    let RequireIdentity(identity) = RequireIdentity::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(identity.id, "dev-1");
    assert_eq!(identity.role, Some(Role::Admin));
}

#[tokio::test]
async fn test_local_bypass_disabled_in_prod() {
    let mut repo = MockSessionRepo::default();
    repo.users.insert("dev-1".to_string(), user("dev-1", Some("admin")));
    let state = app_state(Env::Production, repo);

    let mut parts = parts_with_header(header::HeaderName::from_static("x-user-id"), "dev-1");

    let result = RequireIdentity::from_request_parts(&mut parts, &state).await;
    assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
}
