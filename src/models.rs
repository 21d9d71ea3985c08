use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{
    navigation::{MenuNode, UserMenuEntry},
    roles::{Capability, Role},
    session::Identity,
};

// --- Persistence Rows (Auth.js Prisma schema) ---

/// UserRecord
///
/// A row of the `"User"` table written by the OAuth adapter. Every profile
/// column is nullable there, including the role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct UserRecord {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: Option<String>,
    pub role: Option<String>,
}

/// SessionRecord
///
/// A `"Session"` row joined with its owning `"User"`.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    #[sqlx(flatten)]
    pub user: UserRecord,
    pub expires: DateTime<Utc>,
}

// --- Session Wire Shape ---

/// Session
///
/// The session object as handed out by `/api/auth/session`:
/// `{ user?: { id, name?, email?, image?, role? }, expires? }`.
/// An anonymous session serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<DateTime<Utc>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Session {
            user: Some(record.user.into()),
            expires: Some(record.expires),
        }
    }
}

/// SessionUser
///
/// The principal carried by a session. `role` is the raw claim; it is only
/// interpreted by the role registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<UserRecord> for SessionUser {
    fn from(user: UserRecord) -> Self {
        SessionUser {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image,
            role: user.role,
        }
    }
}

// --- Query Parameters ---

/// NavigationQuery
///
/// `GET /api/navigation?path=/equipes`. A missing path is treated as `/`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct NavigationQuery {
    pub path: Option<String>,
}

/// CallbackQuery
///
/// Post sign-in / sign-out destination, named the way the frontend sends it.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CallbackQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
}

// --- Responses ---

/// NavigationResponse
///
/// Everything the header needs for one render.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NavigationResponse {
    /// `false` under `/admin`, where the administration layout replaces the header.
    pub header_visible: bool,
    pub items: Vec<MenuNode>,
    pub user_menu: Vec<UserMenuEntry>,
}

/// MeResponse
///
/// The resolved identity of the caller and the administration sections it may open.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MeResponse {
    pub identity: Identity,
    pub capabilities: Vec<Capability>,
}

/// AdminOverview
///
/// The administration sidebar for the caller's role.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminOverview {
    pub role: Role,
    pub sidebar: Vec<Capability>,
}

/// CapabilityResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CapabilityResponse {
    pub capability: Capability,
    pub permitted_roles: Vec<Role>,
}
