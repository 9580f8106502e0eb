//! Admin routes for user management.
//!
//! Every route here requires `manage_users`. Users are never deleted; access
//! is removed by suspension.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;

use depthstudio_auth::{catalog, AccessChain, User};
use depthstudio_core::UserId;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;
use crate::middleware::{access_guard, GuardState};

use super::rbac;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

pub fn router(chain: &AccessChain) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", post(assign_role))
        .route("/users/:id/suspend", post(suspend_user))
        .route("/users/:id/activate", post(activate_user))
        .merge(rbac::router())
        .route_layer(from_fn_with_state(
            GuardState::require(chain.clone(), catalog::MANAGE_USERS),
            access_guard,
        ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /admin/users - List every user record
pub async fn list_users(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.directory.list() {
        Ok(users) => (
            StatusCode::OK,
            Json(serde_json::json!({ "count": users.len(), "users": users })),
        )
            .into_response(),
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// GET /admin/users/:id - Get a single user
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match id.parse::<UserId>() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.directory.get(&id) {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::UserResponse { user: &user })).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// POST /admin/users/:id/role - Assign a role
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::RoleRequest>,
) -> axum::response::Response {
    let role = match dto::parse_role(&body.role) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let actor_role = principal.role();

    apply_change(&services, &id, |user| user.assign_role(role, actor_role, Utc::now()))
}

/// POST /admin/users/:id/suspend - Suspend a user
pub async fn suspend_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let actor = principal.user().id.clone();
    apply_change(&services, &id, |user| user.suspend(&actor, Utc::now()))
}

/// POST /admin/users/:id/activate - Lift a suspension
pub async fn activate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    apply_change(&services, &id, |user| user.activate(Utc::now()))
}

fn apply_change(
    services: &AppServices,
    raw_id: &str,
    mut change: impl FnMut(&mut User) -> depthstudio_core::DomainResult<()>,
) -> axum::response::Response {
    let id = match raw_id.parse::<UserId>() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.directory.update(&id, &mut change) {
        Ok(user) => {
            tracing::info!(uid = %user.id, status = %user.status, role = ?user.role, "user updated");
            (StatusCode::OK, Json(dto::UserResponse { user: &user })).into_response()
        }
        Err(e) => errors::directory_error_to_response(e),
    }
}
