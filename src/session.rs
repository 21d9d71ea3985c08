use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    models::Session,
    roles::{self, Role},
};

/// Display name used when the principal has neither a name nor a usable email.
pub const PLACEHOLDER_NAME: &str = "Utilisateur";

/// Identity
///
/// The normalized view of an authenticated principal, built fresh for every
/// request from the session and dropped with the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Identity {
    pub id: String,
    /// Never empty: falls back to the email local part, then [`PLACEHOLDER_NAME`].
    pub name: String,
    /// Empty when the provider did not share an email.
    pub email: String,
    /// Empty when the principal has no avatar.
    pub image_url: String,
    /// `None` for a missing or unrecognized claim.
    pub role: Option<Role>,
    pub is_admin: bool,
}

impl Identity {
    /// Avatar fallback: first character of the display name, uppercased.
    pub fn initials(&self) -> String {
        self.name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

/// resolve_identity
///
/// Maps a raw session onto an [`Identity`], or `None` for an anonymous visitor.
/// Performs no I/O; loading the session is the job of [`crate::auth`].
pub fn resolve_identity(session: &Session) -> Option<Identity> {
    let user = session.user.as_ref()?;
    let email = user.email.as_deref().unwrap_or_default();

    let name = non_empty(user.name.as_deref())
        .or_else(|| non_empty(email.split('@').next()))
        .unwrap_or(PLACEHOLDER_NAME)
        .to_string();

    let claim = user.role.as_deref();

    Some(Identity {
        id: user.id.clone(),
        name,
        email: email.to_string(),
        image_url: user.image.clone().unwrap_or_default(),
        role: claim.and_then(Role::parse),
        is_admin: roles::is_admin_role(claim),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
