#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, Utc};
use club_portal::{
    AppState,
    config::{AppConfig, Env},
    error::SessionError,
    models::{SessionRecord, UserRecord},
    repository::SessionRepository,
};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

// --- Mock Session Store ---

/// In-memory stand-in for the Postgres session tables.
#[derive(Default)]
pub struct MockSessionRepo {
    pub sessions: HashMap<String, SessionRecord>,
    pub users: HashMap<String, UserRecord>,
    /// When set, every call fails the way a dropped connection would.
    pub fail: bool,
    pub deleted: Mutex<Vec<String>>,
}

impl MockSessionRepo {
    pub fn with_session(mut self, token: &str, user: UserRecord) -> Self {
        self.users.insert(user.id.clone(), user.clone());
        self.sessions.insert(
            token.to_string(),
            SessionRecord {
                user,
                expires: Utc::now() + Duration::days(30),
            },
        );
        self
    }

    pub fn failing() -> Self {
        MockSessionRepo {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SessionRepository for MockSessionRepo {
    async fn find_session(&self, token: &str) -> Result<Option<SessionRecord>, SessionError> {
        if self.fail {
            return Err(SessionError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.sessions.get(token).cloned())
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>, SessionError> {
        if self.fail {
            return Err(SessionError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(self.users.get(id).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<bool, SessionError> {
        self.deleted.lock().unwrap().push(token.to_string());
        Ok(self.sessions.contains_key(token))
    }
}

// --- Fixtures ---

pub const TEST_SECRET: &str = "test-secret-value-1234567890";

pub fn user(id: &str, role: Option<&str>) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        name: Some(format!("User {id}")),
        email: Some(format!("{id}@bouzonville-handball.fr")),
        image: None,
        role: role.map(str::to_string),
    }
}

pub fn app_state(env: Env, repo: MockSessionRepo) -> AppState {
    let mut config = AppConfig::default();
    config.env = env;
    config.auth_secret = TEST_SECRET.to_string();
    app_state_with(config, repo)
}

pub fn app_state_with(config: AppConfig, repo: MockSessionRepo) -> AppState {
    AppState {
        repo: Arc::new(repo),
        config,
    }
}

/// A repository holding one session per interesting role.
pub fn seeded_repo() -> MockSessionRepo {
    MockSessionRepo::default()
        .with_session("tok-coach", user("coach-1", Some("coach")))
        .with_session("tok-com", user("com-1", Some("com")))
        .with_session("tok-joueur", user("joueur-1", Some("joueur")))
        .with_session("tok-unknown", user("ghost-1", Some("superuser")))
}
