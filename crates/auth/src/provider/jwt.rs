use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{validate_claims, JwtClaims};

use super::{Identity, IdentityProvider, ProviderError};

/// Local HS256 token verification.
///
/// Signature checking is delegated to `jsonwebtoken`; the time window is
/// checked by [`validate_claims`] so expiry behaves the same everywhere.
#[derive(Clone)]
pub struct Hs256IdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256IdentityProvider {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Verify against an explicit clock.
    pub fn verify_at(&self, credential: &str, now: DateTime<Utc>) -> Result<Identity, ProviderError> {
        let data = jsonwebtoken::decode::<JwtClaims>(credential, &self.key, &self.validation)
            .map_err(|e| ProviderError::InvalidCredential(format!("malformed token: {e}")))?;

        validate_claims(&data.claims, now)
            .map_err(|e| ProviderError::InvalidCredential(e.to_string()))?;

        Ok(Identity {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}

impl core::fmt::Debug for Hs256IdentityProvider {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256IdentityProvider").finish_non_exhaustive()
    }
}

#[async_trait]
impl IdentityProvider for Hs256IdentityProvider {
    async fn verify(&self, credential: &str) -> Result<Identity, ProviderError> {
        self.verify_at(credential, Utc::now())
    }
}
