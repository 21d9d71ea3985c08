use club_portal::{
    models::{Session, SessionUser},
    roles::Role,
    session::{PLACEHOLDER_NAME, resolve_identity},
};

fn session_with(user: SessionUser) -> Session {
    Session {
        user: Some(user),
        expires: None,
    }
}

fn principal() -> SessionUser {
    SessionUser {
        id: "cuid-1".to_string(),
        name: Some("Camille Martin".to_string()),
        email: Some("camille@example.fr".to_string()),
        image: Some("https://cdn.example.fr/a.png".to_string()),
        role: Some("coach".to_string()),
    }
}

#[test]
fn test_anonymous_session_resolves_to_none() {
    assert_eq!(resolve_identity(&Session::anonymous()), None);
}

#[test]
fn test_full_principal() {
    let identity = resolve_identity(&session_with(principal())).unwrap();
    assert_eq!(identity.id, "cuid-1");
    assert_eq!(identity.name, "Camille Martin");
    assert_eq!(identity.email, "camille@example.fr");
    assert_eq!(identity.image_url, "https://cdn.example.fr/a.png");
    assert_eq!(identity.role, Some(Role::Coach));
    assert!(identity.is_admin);
    assert_eq!(identity.initials(), "C");
}

#[test]
fn test_name_falls_back_to_email_local_part() {
    let user = SessionUser {
        name: None,
        ..principal()
    };
    assert_eq!(resolve_identity(&session_with(user)).unwrap().name, "camille");

    let user = SessionUser {
        name: Some(String::new()),
        ..principal()
    };
    assert_eq!(resolve_identity(&session_with(user)).unwrap().name, "camille");
}

#[test]
fn test_name_falls_back_to_placeholder() {
    let user = SessionUser {
        name: None,
        email: None,
        ..principal()
    };
    let identity = resolve_identity(&session_with(user)).unwrap();
    assert_eq!(identity.name, PLACEHOLDER_NAME);
    assert_eq!(identity.email, "");
    assert_eq!(identity.initials(), "U");

    let user = SessionUser {
        name: None,
        email: Some("@example.fr".to_string()),
        ..principal()
    };
    assert_eq!(resolve_identity(&session_with(user)).unwrap().name, PLACEHOLDER_NAME);
}

#[test]
fn test_missing_image_is_empty() {
    let user = SessionUser {
        image: None,
        ..principal()
    };
    assert_eq!(resolve_identity(&session_with(user)).unwrap().image_url, "");
}

#[test]
fn test_role_claims_fail_closed() {
    for claim in [None, Some("joueur"), Some("user"), Some("superuser"), Some("ADMIN")] {
        let user = SessionUser {
            role: claim.map(str::to_string),
            ..principal()
        };
        let identity = resolve_identity(&session_with(user)).unwrap();
        assert!(!identity.is_admin, "claim {:?} must not be admin", claim);
    }

    let user = SessionUser {
        role: Some("superuser".to_string()),
        ..principal()
    };
    assert_eq!(resolve_identity(&session_with(user)).unwrap().role, None);
}

#[test]
fn test_session_wire_shape() {
    assert_eq!(serde_json::to_value(Session::anonymous()).unwrap(), serde_json::json!({}));

    let parsed: Session =
        serde_json::from_value(serde_json::json!({ "user": { "id": "u1", "role": "dev" } }))
            .unwrap();
    let identity = resolve_identity(&parsed).unwrap();
    assert_eq!(identity.name, PLACEHOLDER_NAME);
    assert!(identity.is_admin);
}
