//! Stage 3: the route/action guard, plus audit helpers.

use serde::Serialize;

use crate::permissions::catalog;
use crate::{AuthError, Permission, ResolvedPrincipal, Role, RolePermissionTable, UserStatus};

/// Decide whether `principal` may perform `action`.
///
/// Suspension is checked before any permission lookup, so a suspended user is
/// denied whatever their role.
///
/// - No IO
/// - No panics
pub fn authorize(principal: &ResolvedPrincipal, action: &Permission) -> Result<(), AuthError> {
    authorize_status(principal)?;

    if principal.permissions.allows(action) {
        Ok(())
    } else {
        Err(AuthError::forbidden(format!(
            "role '{}' lacks permission '{}'",
            principal.role, action
        )))
    }
}

/// The action-independent half of [`authorize`]: a suspended user is denied
/// before any action is considered.
pub fn authorize_status(principal: &ResolvedPrincipal) -> Result<(), AuthError> {
    if principal.user.is_suspended() {
        return Err(AuthError::forbidden("user is suspended"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub action: String,
    pub granted: bool,
    pub reason: String,
    pub principal: PrincipalState,
    pub denial_reason: Option<DenialReason>,
}

/// Current state of the principal being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: String,
    pub role: Role,
    pub status: UserStatus,
    pub effective_permissions: Vec<String>,
    pub has_wildcard: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Suspended,
    MissingPermission,
}

/// Explain why [`authorize`] allows or denies `action` for `principal`.
///
/// Always agrees with [`authorize`]; the table is only used to suggest which
/// roles would grant a missing permission.
pub fn explain_authorization(
    principal: &ResolvedPrincipal,
    action: &Permission,
    table: &RolePermissionTable,
) -> AuthorizationExplanation {
    let state = PrincipalState {
        user_id: principal.user.id.to_string(),
        role: principal.role,
        status: principal.user.status,
        effective_permissions: principal.permissions.iter().map(|p| p.to_string()).collect(),
        has_wildcard: principal.permissions.has_wildcard(),
    };

    match authorize(principal, action) {
        Ok(()) => {
            let reason = if state.has_wildcard {
                format!("role '{}' holds the wildcard permission '*'", principal.role)
            } else {
                format!("role '{}' grants '{}'", principal.role, action)
            };
            AuthorizationExplanation {
                action: action.to_string(),
                granted: true,
                reason,
                principal: state,
                denial_reason: None,
            }
        }
        Err(_) if principal.user.is_suspended() => AuthorizationExplanation {
            action: action.to_string(),
            granted: false,
            reason: "user is suspended; every action is denied".to_string(),
            principal: state,
            denial_reason: Some(DenialReason {
                kind: DenialKind::Suspended,
                message: "Suspended users are denied before permissions are consulted".to_string(),
                suggestions: vec!["Ask an administrator to reactivate the account".to_string()],
            }),
        },
        Err(_) => {
            let granting: Vec<String> = table
                .roles_granting(action)
                .into_iter()
                .map(|r| r.to_string())
                .collect();

            let mut suggestions = Vec::new();
            if granting.is_empty() {
                suggestions.push(format!("No role grants '{action}'; check the action name"));
            } else {
                suggestions.push(format!("Roles that grant '{action}': {}", granting.join(", ")));
            }

            AuthorizationExplanation {
                action: action.to_string(),
                granted: false,
                reason: format!("role '{}' does not grant '{}'", principal.role, action),
                principal: state,
                denial_reason: Some(DenialReason {
                    kind: DenialKind::MissingPermission,
                    message: format!("Missing required permission: '{action}'"),
                    suggestions,
                }),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub permissions: Vec<String>,
    pub description: &'static str,
    pub self_selectable: bool,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: String,
    pub description: Option<&'static str>,
    pub granted_to: Vec<Role>,
}

/// Complete view of the RBAC configuration.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: Vec<RoleDefinition>,
    pub permissions: Vec<PermissionDefinition>,
}

impl RbacRegistry {
    pub fn from_table(table: &RolePermissionTable) -> Self {
        let roles = Role::ALL
            .into_iter()
            .map(|role| RoleDefinition {
                name: role,
                permissions: table.permissions_for(role).iter().map(|p| p.to_string()).collect(),
                description: role.description(),
                self_selectable: role.is_self_selectable(),
            })
            .collect();

        let permissions = catalog::NAMED
            .iter()
            .map(|perm| PermissionDefinition {
                name: perm.to_string(),
                description: catalog::description(perm),
                granted_to: table.roles_granting(perm),
            })
            .collect();

        Self { roles, permissions }
    }

    pub fn role(&self, role: Role) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| r.name == role)
    }
}
