//! The per-request access chain: verify → resolve → guard.
//!
//! Each request runs the whole chain from scratch; nothing is cached between
//! requests and no stage is retried.

use std::sync::Arc;

use crate::{
    authorize, authorize_status, resolve, AuthError, CredentialVerifier, Permission, ResolvedPrincipal,
    RolePermissionTable,
};

#[derive(Debug, Clone)]
pub struct AccessChain {
    verifier: CredentialVerifier,
    table: Arc<RolePermissionTable>,
}

impl AccessChain {
    pub fn new(verifier: CredentialVerifier, table: Arc<RolePermissionTable>) -> Self {
        Self { verifier, table }
    }

    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    pub fn table(&self) -> &RolePermissionTable {
        &self.table
    }

    /// Verify, resolve and apply the status check, without checking a
    /// specific action. Suspended users are denied here too.
    pub async fn authenticate(&self, credential: Option<&str>) -> Result<ResolvedPrincipal, AuthError> {
        let user = self.verifier.verify(credential).await?;
        let principal = resolve(&self.table, user)?;
        authorize_status(&principal)?;
        Ok(principal)
    }

    /// Run the full chain for `action`; the principal is returned only when allowed.
    pub async fn evaluate(
        &self,
        credential: Option<&str>,
        action: &Permission,
    ) -> Result<ResolvedPrincipal, AuthError> {
        let principal = self.authenticate(credential).await?;
        authorize(&principal, action)?;
        tracing::debug!(uid = %principal.user.id, %action, "access allowed");
        Ok(principal)
    }
}
