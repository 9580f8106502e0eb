//! Process configuration, read from the environment once at startup.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};

use depthstudio_auth::DEFAULT_PROVIDER_TIMEOUT;
use depthstudio_core::UserId;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

/// Which identity provider verifies bearer credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HS256 tokens checked locally with a shared secret.
    Jwt { secret: String },
    /// Tokens checked by a hosted lookup endpoint.
    Remote { endpoint: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub provider: ProviderConfig,
    pub provider_timeout: Duration,
    /// Seeded as an active admin so a fresh deployment can be administered.
    pub bootstrap_admin: Option<UserId>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8080")?;

        let provider = match var("IDENTITY_PROVIDER").as_deref().unwrap_or("jwt") {
            "jwt" => ProviderConfig::Jwt {
                secret: var("JWT_SECRET").unwrap_or_else(|| {
                    tracing::warn!("JWT_SECRET not set; using insecure dev default");
                    DEV_JWT_SECRET.to_string()
                }),
            },
            "remote" => ProviderConfig::Remote {
                endpoint: var("IDENTITY_PROVIDER_URL")
                    .context("IDENTITY_PROVIDER_URL must be set when IDENTITY_PROVIDER=remote")?,
            },
            other => bail!("IDENTITY_PROVIDER must be 'jwt' or 'remote', got '{other}'"),
        };

        let provider_timeout = match var("IDENTITY_PROVIDER_TIMEOUT_MS") {
            Some(ms) => {
                let ms: u64 = ms
                    .parse()
                    .context("IDENTITY_PROVIDER_TIMEOUT_MS must be an integer")?;
                if ms == 0 {
                    bail!("IDENTITY_PROVIDER_TIMEOUT_MS must be greater than zero");
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_PROVIDER_TIMEOUT,
        };

        let bootstrap_admin = var("BOOTSTRAP_ADMIN_UID")
            .map(UserId::new)
            .transpose()
            .context("BOOTSTRAP_ADMIN_UID is not a valid uid")?;

        Ok(Self {
            bind_addr,
            provider,
            provider_timeout,
            bootstrap_admin,
        })
    }

    /// Local-token configuration used by tests and development.
    pub fn with_jwt_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            provider: ProviderConfig::Jwt {
                secret: secret.into(),
            },
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            bootstrap_admin: None,
        }
    }
}
