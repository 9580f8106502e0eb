//! Business endpoints behind the guard.
//!
//! The handlers only acknowledge the authorized principal; the studio's real
//! reporting/scheduling/content logic lives outside this service.

use axum::{
    extract::Extension,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use depthstudio_auth::{catalog, AccessChain, Permission};

use crate::context::PrincipalContext;
use crate::middleware::{access_guard, GuardState};

pub fn router(chain: &AccessChain) -> Router {
    let guarded = |action: Permission| {
        from_fn_with_state(GuardState::require(chain.clone(), action), access_guard)
    };

    Router::new()
        .route(
            "/reports/financial",
            get(financial_report).route_layer(guarded(catalog::VIEW_FINANCIAL_REPORTS)),
        )
        .route(
            "/schedules",
            get(schedules).route_layer(guarded(catalog::VIEW_SCHEDULES)),
        )
        .route(
            "/content",
            post(upload_content).route_layer(guarded(catalog::UPLOAD_CONTENT)),
        )
}

fn acknowledge(principal: &PrincipalContext, action: Permission) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "action": action,
        "user_id": principal.user().id.to_string(),
        "role": principal.role(),
    }))
}

pub async fn financial_report(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    acknowledge(&principal, catalog::VIEW_FINANCIAL_REPORTS)
}

pub async fn schedules(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    acknowledge(&principal, catalog::VIEW_SCHEDULES)
}

pub async fn upload_content(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    acknowledge(&principal, catalog::UPLOAD_CONTENT)
}
