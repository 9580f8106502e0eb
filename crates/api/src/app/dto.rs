use serde::{Deserialize, Serialize};

use depthstudio_auth::{AuthorizationExplanation, Permission, Role, User};
use depthstudio_core::DomainError;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub display_name: Option<String>,
}

impl RegisterRequest {
    /// The body is optional; when present it must be valid JSON.
    pub fn from_body(raw: &[u8]) -> Result<Self, DomainError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(raw)
            .map_err(|e| DomainError::validation(format!("malformed request body: {e}")))
    }
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionQuery {
    pub action: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct UserResponse<'a> {
    pub user: &'a User,
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub allowed: bool,
    pub explanation: AuthorizationExplanation,
}

// -------------------------
// Parsing helpers
// -------------------------

pub fn parse_role(raw: &str) -> Result<Role, DomainError> {
    raw.parse()
}

/// Action identifiers are lowercase snake_case permission names (or `*`).
pub fn parse_action(raw: &str) -> Result<Permission, DomainError> {
    let action = raw.trim();
    let valid = action == "*"
        || (!action.is_empty()
            && action.len() <= 64
            && action.chars().all(|c| c.is_ascii_lowercase() || c == '_'));
    if !valid {
        return Err(DomainError::validation(format!("invalid action '{action}'")));
    }
    Ok(Permission::new(action.to_string()))
}
