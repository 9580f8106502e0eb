//! User record for identity management.
//!
//! Users are created on registration, mutated on role/status changes and never
//! hard-deleted: removing access is always a status change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use depthstudio_core::{DomainError, DomainResult, UserId};

use crate::Role;

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// User account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// Registered but has not completed role selection.
    #[default]
    Pending,
    /// User is active and can transact.
    Active,
    /// User is suspended; every action is denied.
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Active => "active",
            UserStatus::Suspended => "suspended",
        }
    }
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A Depth Studio user.
///
/// # Invariants
/// - `id` is the identity-provider uid and never changes.
/// - An `active` user always has a role.
/// - Suspended users cannot be assigned new roles.
/// - Users cannot escalate their own privileges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
    pub display_name: String,
    pub role: Option<Role>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// A freshly registered user: pending, no role.
    ///
    /// `email` comes from the identity provider and is stored as given,
    /// trimmed and lowercased.
    pub fn register(
        id: UserId,
        email: Option<String>,
        display_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let email = email.as_deref().and_then(normalize_email);
        let display_name = display_name.into().trim().to_string();
        let display_name = if display_name.is_empty() {
            email.clone().unwrap_or_else(|| id.to_string())
        } else {
            display_name
        };

        Self {
            id,
            email,
            display_name,
            role: None,
            status: UserStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// A user that has already been onboarded with `role`.
    pub fn active(id: UserId, display_name: impl Into<String>, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id,
            email: None,
            display_name: display_name.into(),
            role: Some(role),
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.status == UserStatus::Suspended
    }

    /// Whether the user is still between registration and role selection.
    pub fn is_onboarding(&self) -> bool {
        self.role.is_none() || self.status == UserStatus::Pending
    }

    fn ensure_not_suspended(&self) -> DomainResult<()> {
        if self.is_suspended() {
            return Err(DomainError::invariant("user is suspended"));
        }
        Ok(())
    }

    /// Complete onboarding by picking a role.
    pub fn select_role(&mut self, role: Role, now: DateTime<Utc>) -> DomainResult<()> {
        self.ensure_not_suspended()?;
        if !self.is_onboarding() {
            return Err(DomainError::invariant("role selection already completed"));
        }
        if !role.is_self_selectable() {
            return Err(DomainError::Unauthorized);
        }
        self.role = Some(role);
        self.status = UserStatus::Active;
        self.updated_at = now;
        Ok(())
    }

    /// Assign a role on behalf of `actor_role` (admin tooling).
    ///
    /// Only admins may grant `admin`.
    pub fn assign_role(
        &mut self,
        role: Role,
        actor_role: Role,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.ensure_not_suspended()?;
        if role == Role::Admin && actor_role != Role::Admin {
            return Err(DomainError::Unauthorized);
        }
        self.role = Some(role);
        self.status = UserStatus::Active;
        self.updated_at = now;
        Ok(())
    }

    pub fn suspend(&mut self, actor: &UserId, now: DateTime<Utc>) -> DomainResult<()> {
        if actor == &self.id {
            return Err(DomainError::invariant("users cannot suspend themselves"));
        }
        if self.is_suspended() {
            return Ok(());
        }
        self.status = UserStatus::Suspended;
        self.updated_at = now;
        Ok(())
    }

    /// Lift a suspension. A user without a role goes back to onboarding.
    pub fn activate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.is_suspended() {
            return Ok(());
        }
        self.status = if self.role.is_some() {
            UserStatus::Active
        } else {
            UserStatus::Pending
        };
        self.updated_at = now;
        Ok(())
    }
}

fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    (!email.is_empty()).then_some(email)
}
