use depthstudio_auth::{Identity, PermissionSet, ResolvedPrincipal, Role, User};

/// Principal context for a request that passed the access chain.
///
/// Business handlers read `(user, role, permissions)` from here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    principal: ResolvedPrincipal,
}

impl PrincipalContext {
    pub fn new(principal: ResolvedPrincipal) -> Self {
        Self { principal }
    }

    pub fn user(&self) -> &User {
        &self.principal.user
    }

    pub fn role(&self) -> Role {
        self.principal.role
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.principal.permissions
    }

    pub fn principal(&self) -> &ResolvedPrincipal {
        &self.principal
    }
}

/// Identity context for onboarding routes, where no user record may exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity: Identity,
}

impl IdentityContext {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}
