use core::str::FromStr;

use serde::{Deserialize, Serialize};

use depthstudio_core::DomainError;

/// Role identifier used for RBAC.
///
/// Roles form a closed set; the permissions each one grants live in
/// [`crate::RolePermissionTable`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    BrandCoordinator,
    MarketingCoordinator,
    Photographer,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::BrandCoordinator,
        Role::MarketingCoordinator,
        Role::Photographer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::BrandCoordinator => "brand_coordinator",
            Role::MarketingCoordinator => "marketing_coordinator",
            Role::Photographer => "photographer",
        }
    }

    /// Whether a user may pick this role for themselves during onboarding.
    ///
    /// `admin` can only be granted by another admin.
    pub fn is_self_selectable(&self) -> bool {
        !matches!(self, Role::Admin)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Admin => "Studio administrator with every permission",
            Role::BrandCoordinator => "Coordinates brands, campaigns and shoot schedules",
            Role::MarketingCoordinator => "Runs campaigns, analytics and financial reporting",
            Role::Photographer => "Shoots, uploads content and manages own equipment",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| DomainError::validation(format!("unknown role '{}'", s.trim())))
    }
}
