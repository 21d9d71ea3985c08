use thiserror::Error;

/// SessionError
///
/// Failures while loading a session from the persistence adapter or a signed token.
/// None of these reach the client: the auth layer logs them and continues as anonymous.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session lookup failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("session token rejected: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// NavigationError
///
/// A malformed navigation table. Raised by `navigation::validate` at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("navigation entry `{label}` has neither a link nor children")]
    EmptyNode { label: String },
    #[error("navigation entry `{label}` has both a link and children")]
    AmbiguousNode { label: String },
}
