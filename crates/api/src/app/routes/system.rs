use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user().id.to_string(),
        "display_name": principal.user().display_name,
        "status": principal.user().status,
        "role": principal.role(),
        "permissions": principal.permissions(),
    }))
}
