//! `depthstudio-auth`: the authentication/authorization chain.
//!
//! This crate is intentionally decoupled from HTTP routing: it turns an
//! opaque credential plus a requested action into an allowed principal or a
//! typed denial.

pub mod authorize;
pub mod chain;
pub mod claims;
pub mod directory;
pub mod error;
pub mod permissions;
pub mod provider;
pub mod resolver;
pub mod roles;
pub mod user;
pub mod verifier;

pub use authorize::{authorize, authorize_status, explain_authorization, AuthorizationExplanation, RbacRegistry};
pub use chain::AccessChain;
pub use claims::{validate_claims, JwtClaims, TokenValidationError};
pub use directory::{DirectoryError, InMemoryUserDirectory, UserDirectory};
pub use error::AuthError;
pub use permissions::{catalog, Permission};
pub use provider::{
    Hs256IdentityProvider, Identity, IdentityProvider, ProviderError, RemoteIdentityProvider,
};
pub use resolver::{resolve, PermissionSet, ResolvedPrincipal, RolePermissionTable};
pub use roles::Role;
pub use user::{User, UserStatus};
pub use verifier::{CredentialVerifier, DEFAULT_PROVIDER_TIMEOUT};
