use serde::Serialize;
use utoipa::ToSchema;

use crate::{auth::SIGN_IN_PATH, error::NavigationError, session::Identity};

/// NavEntry
///
/// A hand-authored node of the public navigation tree. A leaf carries an `href`,
/// a branch carries `children`; [`validate`] rejects anything else.
#[derive(Debug, Clone, Copy)]
pub struct NavEntry {
    pub label: &'static str,
    pub href: Option<&'static str>,
    /// Icon reference understood by the frontend icon set.
    pub icon: &'static str,
    pub children: &'static [NavEntry],
}

impl NavEntry {
    pub const fn link(href: &'static str, label: &'static str, icon: &'static str) -> Self {
        NavEntry {
            label,
            href: Some(href),
            icon,
            children: &[],
        }
    }

    pub const fn branch(label: &'static str, icon: &'static str, children: &'static [NavEntry]) -> Self {
        NavEntry {
            label,
            href: None,
            icon,
            children,
        }
    }

    pub fn is_branch(&self) -> bool {
        !self.children.is_empty()
    }
}

const ACTUALITES: &[NavEntry] = &[
    NavEntry::link("/actualites", "Le Fil Info", "file-text"),
    NavEntry::link("/evenements", "Événements Club", "calendar-heart"),
    NavEntry::link("/galerie", "Photos & Vidéos", "image"),
];

const LE_CLUB: &[NavEntry] = &[
    NavEntry::link("/club/histoire", "Histoire & Valeurs", "book-open"),
    NavEntry::link("/club/personnel", "Personnel", "building"),
    NavEntry::link("/club/installations", "Nos Gymnases", "map-pin"),
    NavEntry::link("/club/benevoles", "Devenir Bénévole", "heart-handshake"),
    NavEntry::link("/club/archives", "Archives", "archive"),
];

const SPORTIF: &[NavEntry] = &[
    NavEntry::link("/equipes", "Nos Équipes", "users"),
    NavEntry::link("/competition/calendrier", "Calendrier Week-end", "calendar"),
    NavEntry::link("/competition/resultats", "Résultats & Classements", "list-checks"),
];

const FORMATION: &[NavEntry] = &[
    NavEntry::link("/formation/baby-hand", "Baby Hand (3-5 ans)", "sparkles"),
    NavEntry::link("/formation/ecole-handball", "École de Hand", "user-check"),
    NavEntry::link("/formation/stages", "Stages Vacances", "sun"),
    NavEntry::link("/formation/arbitrage", "École d'Arbitrage", "scale"),
    NavEntry::link("/formation/handfit", "Handfit (Santé)", "dumbbell"),
];

const INFOS_PRATIQUES: &[NavEntry] = &[
    NavEntry::link("/informations/entrainements", "Planning Entraînements", "calendar-clock"),
    NavEntry::link("/informations/licences", "Inscriptions & Tarifs", "file-text"),
    NavEntry::link("/informations/documents", "Documents à télécharger", "folder-open"),
];

/// The public header navigation.
pub static NAV_ITEMS: &[NavEntry] = &[
    NavEntry::link("/", "Accueil", "home"),
    NavEntry::branch("Actualités", "newspaper", ACTUALITES),
    NavEntry::branch("Le Club", "users", LE_CLUB),
    NavEntry::branch("Sportif", "trophy", SPORTIF),
    NavEntry::branch("Formation", "graduation-cap", FORMATION),
    NavEntry::branch("Infos Pratiques", "info", INFOS_PRATIQUES),
    NavEntry::link("/boutique", "Boutique", "store"),
    NavEntry::link("/partenaires", "Partenaires", "handshake"),
];

/// validate
///
/// Checks the leaf/branch invariant over a navigation tree. Run once at startup;
/// a failure is a configuration defect.
pub fn validate(entries: &[NavEntry]) -> Result<(), NavigationError> {
    for entry in entries {
        match (entry.href, entry.is_branch()) {
            (None, false) => {
                return Err(NavigationError::EmptyNode {
                    label: entry.label.to_string(),
                });
            }
            (Some(_), true) => {
                return Err(NavigationError::AmbiguousNode {
                    label: entry.label.to_string(),
                });
            }
            _ => validate(entry.children)?,
        }
    }
    Ok(())
}

// --- Computed Menu ---

/// MenuNode
///
/// A navigation entry annotated for one render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MenuNode {
    pub label: String,
    pub href: Option<String>,
    pub icon: String,
    pub active: bool,
    #[schema(value_type = Vec<Object>)]
    pub children: Vec<MenuNode>,
}

/// UserAction
///
/// What a user-menu entry does when picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UserAction {
    Link { href: String },
    SignIn { href: String },
    SignOut { callback_url: String },
}

/// UserMenuEntry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserMenuEntry {
    pub name: String,
    pub icon: String,
    pub action: UserAction,
}

impl UserMenuEntry {
    fn link(name: &str, href: &str, icon: &str) -> Self {
        UserMenuEntry {
            name: name.to_string(),
            icon: icon.to_string(),
            action: UserAction::Link {
                href: href.to_string(),
            },
        }
    }
}

/// Menu
///
/// Output of [`compute_menu`]: the annotated navigation tree and the ordered user menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    pub items: Vec<MenuNode>,
    pub user_menu: Vec<UserMenuEntry>,
}

/// compute_menu
///
/// Builds the header state for one request from the static [`NAV_ITEMS`] tree.
/// Pure: the same `(identity, current_path)` always produces the same menu.
pub fn compute_menu(identity: Option<&Identity>, current_path: &str) -> Menu {
    compute_menu_from(NAV_ITEMS, identity, current_path)
}

/// compute_menu_from
///
/// [`compute_menu`] over an arbitrary tree, at any depth.
///
/// At most one path is highlighted per render. An entry whose link equals the
/// current path wins outright; failing that, the nested link with the longest
/// href that prefixes the current path on a segment boundary wins. Every ancestor
/// of the winner is marked active; the winner itself only on an exact match.
pub fn compute_menu_from(
    entries: &[NavEntry],
    identity: Option<&Identity>,
    current_path: &str,
) -> Menu {
    let path = normalize(current_path);
    let winner = find_active(entries, path);

    Menu {
        items: annotate(entries, winner.as_ref(), &mut Vec::new()),
        user_menu: user_menu(identity),
    }
}

/// user_menu
///
/// Freshly built per call. Signed-in users get the administration entry first
/// when they hold an admin role, then the personal actions, then sign-out.
pub fn user_menu(identity: Option<&Identity>) -> Vec<UserMenuEntry> {
    let Some(identity) = identity else {
        return vec![UserMenuEntry {
            name: "Connexion".to_string(),
            icon: "user-circle".to_string(),
            action: UserAction::SignIn {
                href: SIGN_IN_PATH.to_string(),
            },
        }];
    };

    let mut entries = Vec::with_capacity(4);
    if identity.is_admin {
        entries.push(UserMenuEntry::link("Administration", "/admin", "layout-dashboard"));
    }
    entries.push(UserMenuEntry::link("Mon Profil", "/profil", "user"));
    entries.push(UserMenuEntry::link("Paramètres", "/parametres", "settings"));
    entries.push(UserMenuEntry {
        name: "Déconnexion".to_string(),
        icon: "arrow-right-on-rectangle".to_string(),
        action: UserAction::SignOut {
            callback_url: "/".to_string(),
        },
    });
    entries
}

/// The public header is replaced by the administration layout under `/admin`.
pub fn header_visible(current_path: &str) -> bool {
    !is_under(normalize(current_path), "/admin")
}

/// is_under
///
/// Segment-aware prefix test: `/club` covers `/club` and `/club/archives` but not
/// `/club-events`.
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
        None => false,
    }
}

/// Position of the highlighted entry, as child indices from the root.
#[derive(Debug, Clone)]
struct ActivePath {
    indices: Vec<usize>,
    exact: bool,
}

impl ActivePath {
    fn marks(&self, position: &[usize]) -> bool {
        if position.len() < self.indices.len() {
            self.indices.starts_with(position)
        } else {
            self.exact && position == self.indices.as_slice()
        }
    }
}

fn find_active(entries: &[NavEntry], path: &str) -> Option<ActivePath> {
    let mut best_prefix = None;
    match search(entries, path, &mut Vec::new(), &mut best_prefix) {
        Some(indices) => Some(ActivePath {
            indices,
            exact: true,
        }),
        None => best_prefix.map(|(_, indices)| ActivePath {
            indices,
            exact: false,
        }),
    }
}

/// Pre-order walk returning the first exact match, recording the longest
/// prefix match on the way.
fn search(
    entries: &[NavEntry],
    path: &str,
    position: &mut Vec<usize>,
    best_prefix: &mut Option<(usize, Vec<usize>)>,
) -> Option<Vec<usize>> {
    for (i, entry) in entries.iter().enumerate() {
        position.push(i);
        if let Some(href) = entry.href {
            if href == path {
                return Some(position.clone());
            }
            // Top-level links only match exactly, so `/` never claims every page.
            let longer = best_prefix.as_ref().is_none_or(|(len, _)| href.len() > *len);
            if position.len() > 1 && longer && is_under(path, href) {
                *best_prefix = Some((href.len(), position.clone()));
            }
        }
        if let Some(found) = search(entry.children, path, position, best_prefix) {
            return Some(found);
        }
        position.pop();
    }
    None
}

fn annotate(entries: &[NavEntry], winner: Option<&ActivePath>, position: &mut Vec<usize>) -> Vec<MenuNode> {
    let mut nodes = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        position.push(i);
        let active = winner.is_some_and(|w| w.marks(position.as_slice()));
        let children = annotate(entry.children, winner, &mut *position);
        position.pop();
        nodes.push(to_node(entry, active, children));
    }
    nodes
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

fn to_node(entry: &NavEntry, active: bool, children: Vec<MenuNode>) -> MenuNode {
    MenuNode {
        label: entry.label.to_string(),
        href: entry.href.map(str::to_string),
        icon: entry.icon.to_string(),
        active,
        children,
    }
}
