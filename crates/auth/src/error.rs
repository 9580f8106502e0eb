//! Access-chain error taxonomy.

use thiserror::Error;

/// Why a request was denied.
///
/// Every variant maps to a distinct response code at the HTTP edge; none of
/// them are retried by the access chain.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential, or a malformed/expired/unknown one.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// The user exists but has not completed role selection.
    #[error("role selection has not been completed")]
    RoleUnassigned,

    /// Authenticated, but the action is not permitted (or the user is suspended).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The upstream identity provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl AuthError {
    pub fn unauthenticated(msg: impl Into<String>) -> Self {
        Self::Unauthenticated(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Unauthenticated(_) => "unauthenticated",
            AuthError::RoleUnassigned => "role_unassigned",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::ProviderUnavailable(_) => "provider_unavailable",
        }
    }
}
