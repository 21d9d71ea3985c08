use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of identity roles stored on the `"User".role` column.
/// Claim values outside this set never map to a variant; callers receive `None`
/// and must treat the principal as non-privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Dev,
    Admin,
    Bureau,
    Com,
    Coach,
    Benevole,
    Joueur,
    User,
}

impl Role {
    /// Every role, in registry order.
    pub const ALL: [Role; 8] = [
        Role::Dev,
        Role::Admin,
        Role::Bureau,
        Role::Com,
        Role::Coach,
        Role::Benevole,
        Role::Joueur,
        Role::User,
    ];

    /// The wire value persisted in the database and carried in session claims.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Dev => "dev",
            Role::Admin => "admin",
            Role::Bureau => "bureau",
            Role::Com => "com",
            Role::Coach => "coach",
            Role::Benevole => "benevole",
            Role::Joueur => "joueur",
            Role::User => "user",
        }
    }

    /// parse
    ///
    /// Maps a raw role claim onto the registry. Matching is exact and case-sensitive,
    /// the same way the claim is compared against the stored values.
    pub fn parse(claim: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == claim)
    }

    pub fn is_admin(self) -> bool {
        ALLOWED_ADMIN_ROLES.contains(&self)
    }
}

/// Roles allowed to see the administration entry point.
pub const ALLOWED_ADMIN_ROLES: &[Role] = &[
    Role::Dev,
    Role::Admin,
    Role::Bureau,
    Role::Com,
    Role::Coach,
];

/// Capability
///
/// A protected section of the administration area. Each section lists the roles
/// allowed to open it in [`Capability::permitted_roles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Capability {
    Dashboard,
    Matches,
    Teams,
    News,
    Gallery,
    Partners,
    Documents,
    Users,
    Settings,
}

impl Capability {
    /// Every capability, in sidebar order.
    pub const ALL: [Capability; 9] = [
        Capability::Dashboard,
        Capability::Matches,
        Capability::Teams,
        Capability::News,
        Capability::Gallery,
        Capability::Partners,
        Capability::Documents,
        Capability::Users,
        Capability::Settings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Dashboard => "dashboard",
            Capability::Matches => "matches",
            Capability::Teams => "teams",
            Capability::News => "news",
            Capability::Gallery => "gallery",
            Capability::Partners => "partners",
            Capability::Documents => "documents",
            Capability::Users => "users",
            Capability::Settings => "settings",
        }
    }

    /// Resolves an `/admin/{capability}` path segment.
    pub fn parse(name: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// permitted_roles
    ///
    /// The permission table. Every row spells out its roles; no role implies another.
    pub fn permitted_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Capability::Dashboard => &[Dev, Admin, Bureau, Com, Coach],
            Capability::Matches => &[Dev, Admin, Coach],
            Capability::Teams => &[Dev, Admin, Bureau, Coach],
            Capability::News => &[Dev, Admin, Com],
            Capability::Gallery => &[Dev, Admin, Com, Coach],
            Capability::Partners => &[Dev, Admin, Bureau],
            Capability::Documents => &[Dev, Admin, Bureau],
            Capability::Users => &[Dev, Admin, Bureau],
            Capability::Settings => &[Dev, Admin],
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.permitted_roles().contains(&role)
    }
}

/// is_admin_role
///
/// Fail-closed admin test on a raw claim: a missing or unrecognized role is never admin.
pub fn is_admin_role(claim: Option<&str>) -> bool {
    claim.and_then(Role::parse).is_some_and(Role::is_admin)
}

/// can_access
///
/// Pure set-membership check of a raw role claim against the permission table.
pub fn can_access(claim: Option<&str>, capability: Capability) -> bool {
    claim
        .and_then(Role::parse)
        .is_some_and(|role| capability.permits(role))
}

/// Capabilities the role may open, in sidebar order. Empty for non-privileged roles.
pub fn accessible_capabilities(role: Option<Role>) -> Vec<Capability> {
    match role {
        Some(role) => Capability::ALL
            .into_iter()
            .filter(|c| c.permits(role))
            .collect(),
        None => Vec::new(),
    }
}
