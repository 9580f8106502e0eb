//! Identity-provider integrations.
//!
//! The identity provider owns the credential lifecycle. All the application
//! needs from it is `verify(credential) -> Identity`.

use async_trait::async_trait;
use thiserror::Error;

use depthstudio_core::UserId;

use crate::AuthError;

mod jwt;
mod remote;

pub use jwt::Hs256IdentityProvider;
pub use remote::RemoteIdentityProvider;

/// What the identity provider vouches for once a credential checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: UserId,
    pub email: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider answered and rejected the credential.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The provider could not give an answer.
    #[error("{0}")]
    Unavailable(String),
}

impl From<ProviderError> for AuthError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::InvalidCredential(msg) => AuthError::Unauthenticated(msg),
            ProviderError::Unavailable(msg) => AuthError::ProviderUnavailable(msg),
        }
    }
}

/// Verifies opaque credentials against an external identity service.
///
/// Implementations must be read-only and must report "could not reach the
/// provider" as [`ProviderError::Unavailable`], never as an invalid credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<Identity, ProviderError>;
}
