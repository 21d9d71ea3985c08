//! Router Module Index
//!
//! Routes are grouped by the access they need. The route guard in
//! `crate::middleware` sits in front of all of them; the groups below
//! only differ in what the handlers check on top of it.

/// Routes reachable without a session (exempt from the route guard).
pub mod public;

/// Routes for any signed-in visitor.
pub mod authenticated;

/// Administration routes. Handlers check the caller's role against the
/// permission table.
pub mod admin;
