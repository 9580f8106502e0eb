//! The access guard: runs the access chain in front of protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use depthstudio_auth::{AccessChain, AuthError, Permission};

use crate::app::errors::auth_error_to_response;
use crate::context::{IdentityContext, PrincipalContext};

/// How much of the chain a route requires.
#[derive(Debug, Clone)]
pub enum GuardMode {
    /// Credential only; no user record needed (onboarding).
    Identify,
    /// Verify + resolve; any onboarded user.
    Authenticate,
    /// Full chain for one action.
    Require(Permission),
}

#[derive(Debug, Clone)]
pub struct GuardState {
    chain: AccessChain,
    mode: GuardMode,
}

impl GuardState {
    pub fn new(chain: AccessChain, mode: GuardMode) -> Self {
        Self { chain, mode }
    }

    pub fn require(chain: AccessChain, action: Permission) -> Self {
        Self::new(chain, GuardMode::Require(action))
    }

    fn action_label(&self) -> &str {
        match &self.mode {
            GuardMode::Identify => "-identify",
            GuardMode::Authenticate => "-authenticate",
            GuardMode::Require(action) => action.as_str(),
        }
    }
}

pub async fn access_guard(State(state): State<GuardState>, mut req: Request, next: Next) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "access",
        %request_id,
        action = state.action_label(),
        method = %req.method(),
        path = %req.uri().path(),
    );

    let credential = match bearer_credential(req.headers()) {
        Ok(c) => c.map(str::to_owned),
        Err(err) => return deny(&span, err),
    };
    let credential = credential.as_deref();

    let outcome = async {
        match &state.mode {
            GuardMode::Identify => state
                .chain
                .verifier()
                .identify(credential)
                .await
                .map(|identity| {
                    req.extensions_mut().insert(IdentityContext::new(identity));
                }),
            GuardMode::Authenticate => state
                .chain
                .authenticate(credential)
                .await
                .map(|principal| {
                    req.extensions_mut().insert(PrincipalContext::new(principal));
                }),
            GuardMode::Require(action) => state
                .chain
                .evaluate(credential, action)
                .await
                .map(|principal| {
                    req.extensions_mut().insert(PrincipalContext::new(principal));
                }),
        }
    }
    .instrument(span.clone())
    .await;

    match outcome {
        Ok(()) => next.run(req).instrument(span).await,
        Err(err) => deny(&span, err),
    }
}

fn deny(span: &tracing::Span, err: AuthError) -> Response {
    span.in_scope(|| match &err {
        AuthError::ProviderUnavailable(msg) => {
            tracing::error!(code = err.code(), "identity provider unavailable: {msg}")
        }
        _ => tracing::warn!(code = err.code(), "access denied: {err}"),
    });
    auth_error_to_response(&err).into_response()
}

/// Pull the credential out of `Authorization: Bearer <token>`.
///
/// A missing header is `Ok(None)` so the chain reports it uniformly; a header
/// with another scheme is rejected here.
fn bearer_credential(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(header) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let header = header
        .to_str()
        .map_err(|_| AuthError::unauthenticated("authorization header is not valid ASCII"))?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AuthError::unauthenticated("authorization header must use the Bearer scheme"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::unauthenticated(
            "authorization header must use the Bearer scheme",
        ));
    }

    Ok(Some(token.trim()))
}
