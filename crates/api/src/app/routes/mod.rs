use axum::{middleware::from_fn_with_state, routing::get, Router};

use depthstudio_auth::AccessChain;

use crate::middleware::{access_guard, GuardMode, GuardState};

pub mod access;
pub mod admin;
pub mod onboarding;
pub mod rbac;
pub mod studio;
pub mod system;

/// Router for every credential-bearing endpoint.
///
/// Each group carries its own guard as a route layer, so unknown paths still
/// fall through to a plain 404.
pub fn router(chain: &AccessChain) -> Router {
    let authenticated = Router::new()
        .route("/whoami", get(system::whoami))
        .route("/access/check", get(access::check))
        .route_layer(from_fn_with_state(
            GuardState::new(chain.clone(), GuardMode::Authenticate),
            access_guard,
        ));

    Router::new()
        .nest("/onboarding", onboarding::router(chain))
        .nest("/admin", admin::router(chain))
        .merge(studio::router(chain))
        .merge(authenticated)
}
