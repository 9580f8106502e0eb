//! Stage 1: credential → user record.

use std::sync::Arc;
use std::time::Duration;

use crate::directory::{DirectoryError, UserDirectory};
use crate::provider::{Identity, IdentityProvider};
use crate::{AuthError, User};

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(3);

/// Validates a bearer credential with the identity provider and loads the
/// matching user record.
///
/// Read-only; holds no per-request state, so one instance is shared by all
/// requests.
#[derive(Clone)]
pub struct CredentialVerifier {
    provider: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
    timeout: Duration,
}

impl CredentialVerifier {
    pub fn new(provider: Arc<dyn IdentityProvider>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            provider,
            directory,
            timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn directory(&self) -> &Arc<dyn UserDirectory> {
        &self.directory
    }

    /// Ask the identity provider who the credential belongs to.
    ///
    /// Does not require a user record (used by registration).
    pub async fn identify(&self, credential: Option<&str>) -> Result<Identity, AuthError> {
        let credential = well_formed(credential)?;

        match tokio::time::timeout(self.timeout, self.provider.verify(credential)).await {
            Ok(result) => result.map_err(AuthError::from),
            Err(_elapsed) => Err(AuthError::provider_unavailable(format!(
                "identity provider timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }

    /// Resolve a credential to its user record.
    pub async fn verify(&self, credential: Option<&str>) -> Result<User, AuthError> {
        let identity = self.identify(credential).await?;

        match self.directory.get(&identity.uid) {
            Ok(Some(user)) => {
                tracing::debug!(uid = %user.id, "credential verified");
                Ok(user)
            }
            Ok(None) => Err(AuthError::unauthenticated(
                "no user record for this credential; register first",
            )),
            Err(DirectoryError::Unavailable(msg)) => Err(AuthError::provider_unavailable(msg)),
            Err(DirectoryError::Domain(e)) => Err(AuthError::provider_unavailable(e.to_string())),
        }
    }
}

impl core::fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn well_formed(credential: Option<&str>) -> Result<&str, AuthError> {
    let credential = credential
        .map(str::trim)
        .ok_or_else(|| AuthError::unauthenticated("missing credential"))?;

    if credential.is_empty() {
        return Err(AuthError::unauthenticated("missing credential"));
    }
    if credential.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AuthError::unauthenticated("malformed credential"));
    }
    Ok(credential)
}
