//! Stage 2: user → role + permission set.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::permissions::catalog;
use crate::{AuthError, Permission, Role, User};

/// Effective permissions of a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<Permission>);

impl PermissionSet {
    pub fn has_wildcard(&self) -> bool {
        self.0.iter().any(Permission::is_wildcard)
    }

    /// Whether `action` is granted, directly or via the wildcard.
    pub fn allows(&self, action: &Permission) -> bool {
        self.has_wildcard() || self.0.contains(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Permission> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Static role → permission mapping.
///
/// Built once at process start and shared read-only (behind an `Arc`) with
/// every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissionTable {
    grants: HashMap<Role, PermissionSet>,
}

impl RolePermissionTable {
    pub fn new(grants: impl IntoIterator<Item = (Role, Vec<Permission>)>) -> Self {
        Self {
            grants: grants
                .into_iter()
                .map(|(role, perms)| (role, perms.into_iter().collect()))
                .collect(),
        }
    }

    /// The Depth Studio default mapping.
    pub fn depth_studio() -> Self {
        use catalog::*;

        Self::new([
            (Role::Admin, vec![ALL_ACTIONS]),
            (
                Role::BrandCoordinator,
                vec![
                    MANAGE_BRANDS,
                    MANAGE_CAMPAIGNS,
                    MANAGE_SCHEDULES,
                    VIEW_SCHEDULES,
                    REVIEW_CONTENT,
                ],
            ),
            (
                Role::MarketingCoordinator,
                vec![
                    VIEW_FINANCIAL_REPORTS,
                    MANAGE_CAMPAIGNS,
                    MANAGE_SCHEDULES,
                    VIEW_SCHEDULES,
                    REVIEW_CONTENT,
                    VIEW_ANALYTICS,
                ],
            ),
            (
                Role::Photographer,
                vec![
                    VIEW_SCHEDULES,
                    UPLOAD_CONTENT,
                    MANAGE_EQUIPMENT,
                    VIEW_OWN_EARNINGS,
                ],
            ),
        ])
    }

    /// Permissions granted to `role` (empty for unmapped roles).
    pub fn permissions_for(&self, role: Role) -> PermissionSet {
        self.grants.get(&role).cloned().unwrap_or_default()
    }

    /// Roles whose grants include `action`.
    pub fn roles_granting(&self, action: &Permission) -> Vec<Role> {
        Role::ALL
            .into_iter()
            .filter(|role| self.grants.get(role).is_some_and(|p| p.allows(action)))
            .collect()
    }
}

impl Default for RolePermissionTable {
    fn default() -> Self {
        Self::depth_studio()
    }
}

/// A verified user together with its role and effective permissions.
///
/// This is what business handlers receive once a request is allowed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPrincipal {
    pub user: User,
    pub role: Role,
    pub permissions: PermissionSet,
}

/// Map a user to its role and permission set.
///
/// Users that have not finished role selection fail with
/// [`AuthError::RoleUnassigned`], whatever their status.
pub fn resolve(table: &RolePermissionTable, user: User) -> Result<ResolvedPrincipal, AuthError> {
    let role = match user.role {
        Some(role) if !user.is_onboarding() => role,
        _ => return Err(AuthError::RoleUnassigned),
    };

    let permissions = table.permissions_for(role);
    tracing::debug!(uid = %user.id, %role, permissions = permissions.len(), "principal resolved");

    Ok(ResolvedPrincipal {
        user,
        role,
        permissions,
    })
}
