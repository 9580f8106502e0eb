//! Registration and role selection.
//!
//! These routes only require a credential the identity provider accepts; the
//! user record may not exist yet.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use depthstudio_auth::{AccessChain, User};
use depthstudio_core::DomainError;

use crate::app::{dto, errors, services::AppServices};
use crate::context::IdentityContext;
use crate::middleware::{access_guard, GuardMode, GuardState};

pub fn router(chain: &AccessChain) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/role", post(select_role))
        .route_layer(from_fn_with_state(
            GuardState::new(chain.clone(), GuardMode::Identify),
            access_guard,
        ))
}

/// POST /onboarding/register - create the caller's user record (idempotent).
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    body: Bytes,
) -> axum::response::Response {
    let body = match dto::RegisterRequest::from_body(&body) {
        Ok(b) => b,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let identity = identity.identity();

    let user = User::register(
        identity.uid.clone(),
        identity.email.clone(),
        body.display_name.unwrap_or_default(),
        Utc::now(),
    );

    match services.directory.insert_if_absent(user) {
        Ok(stored) => {
            tracing::info!(uid = %stored.id, status = %stored.status, "user registered");
            (StatusCode::OK, Json(dto::UserResponse { user: &stored })).into_response()
        }
        Err(e) => errors::directory_error_to_response(e),
    }
}

/// POST /onboarding/role - pick a role and become active.
pub async fn select_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<IdentityContext>,
    Json(body): Json<dto::RoleRequest>,
) -> axum::response::Response {
    let role = match dto::parse_role(&body.role) {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let uid = &identity.identity().uid;
    match services
        .directory
        .update(uid, &mut |user: &mut User| user.select_role(role, Utc::now()))
    {
        Ok(user) => {
            tracing::info!(uid = %user.id, %role, "role selected");
            (StatusCode::OK, Json(dto::UserResponse { user: &user })).into_response()
        }
        Err(depthstudio_auth::DirectoryError::Domain(DomainError::NotFound)) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_registered",
            "register before selecting a role",
        ),
        Err(e) => errors::directory_error_to_response(e),
    }
}
