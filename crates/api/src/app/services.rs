//! Service wiring: identity provider, user directory, role table, access chain.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use depthstudio_auth::{
    AccessChain, CredentialVerifier, Hs256IdentityProvider, IdentityProvider,
    InMemoryUserDirectory, RemoteIdentityProvider, Role, RolePermissionTable, User, UserDirectory,
};

use crate::config::{ApiConfig, ProviderConfig};

/// Everything handlers share. Cheap to clone; all members are shared handles.
#[derive(Clone)]
pub struct AppServices {
    pub chain: AccessChain,
    pub directory: Arc<dyn UserDirectory>,
    pub table: Arc<RolePermissionTable>,
}

impl AppServices {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectory>,
        provider_timeout: Duration,
    ) -> Self {
        // Loaded once; read-only for the life of the process.
        let table = Arc::new(RolePermissionTable::depth_studio());
        let verifier = CredentialVerifier::new(provider, directory.clone()).with_timeout(provider_timeout);

        Self {
            chain: AccessChain::new(verifier, table.clone()),
            directory,
            table,
        }
    }

    pub fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let provider: Arc<dyn IdentityProvider> = match &config.provider {
            ProviderConfig::Jwt { secret } => Arc::new(Hs256IdentityProvider::new(secret.as_bytes())),
            ProviderConfig::Remote { endpoint } => {
                tracing::info!(%endpoint, "using remote identity provider");
                Arc::new(RemoteIdentityProvider::new(endpoint.clone(), config.provider_timeout)?)
            }
        };

        let directory = Arc::new(InMemoryUserDirectory::new());
        if let Some(uid) = &config.bootstrap_admin {
            tracing::info!(%uid, "seeding bootstrap admin");
            directory.insert_if_absent(User::active(uid.clone(), "Bootstrap admin", Role::Admin, Utc::now()))?;
        }

        Ok(Self::new(provider, directory, config.provider_timeout))
    }
}
