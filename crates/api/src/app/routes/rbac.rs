//! RBAC audit endpoints for transparent authorization debugging.
//!
//! Mounted under `/admin`, so they inherit the `manage_users` guard.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use depthstudio_auth::{explain_authorization, resolve, AuthError, RbacRegistry};
use depthstudio_core::UserId;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/rbac/roles", get(list_roles))
        .route("/rbac/explain/:id", get(explain_user_authorization))
}

/// GET /admin/rbac/roles - Every role, its permissions, and the permission catalog
pub async fn list_roles(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let registry = RbacRegistry::from_table(&services.table);
    (StatusCode::OK, Json(registry)).into_response()
}

/// GET /admin/rbac/explain/:id?action=... - Why would this user be allowed/denied?
pub async fn explain_user_authorization(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::ActionQuery>,
) -> axum::response::Response {
    let (id, action) = match (id.parse::<UserId>(), dto::parse_action(&query.action)) {
        (Ok(id), Ok(action)) => (id, action),
        (Err(e), _) | (_, Err(e)) => return errors::domain_error_to_response(e),
    };

    let user = match services.directory.get(&id) {
        Ok(Some(u)) => u,
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => return errors::directory_error_to_response(e),
    };

    match resolve(&services.table, user) {
        Ok(principal) => {
            let explanation = explain_authorization(&principal, &action, &services.table);
            (StatusCode::OK, Json(explanation)).into_response()
        }
        Err(err @ AuthError::RoleUnassigned) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "action": action,
                "granted": false,
                "reason": err.to_string(),
                "denial_reason": { "kind": err.code() },
            })),
        )
            .into_response(),
        Err(err) => errors::auth_error_to_response(&err),
    }
}
