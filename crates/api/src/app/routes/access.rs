//! Advisory access checks for UI clients.
//!
//! Clients may hide or show controls based on this answer, but the guard on
//! each route remains the only authority.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use depthstudio_auth::explain_authorization;

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

/// GET /access/check?action=... - would the caller be allowed `action`?
pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::ActionQuery>,
) -> axum::response::Response {
    let action = match dto::parse_action(&query.action) {
        Ok(a) => a,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let explanation = explain_authorization(principal.principal(), &action, &services.table);
    (
        StatusCode::OK,
        Json(dto::AccessCheckResponse {
            allowed: explanation.granted,
            explanation,
        }),
    )
        .into_response()
}
