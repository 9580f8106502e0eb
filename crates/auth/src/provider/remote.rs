use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use depthstudio_core::UserId;

use super::{Identity, IdentityProvider, ProviderError};

/// Token verification delegated to a hosted identity service.
///
/// Speaks the `accounts:lookup` shape: `POST {endpoint}` with
/// `{"idToken": ...}`, answered by `{"users": [{"localId": ..., "email": ...}]}`.
#[derive(Debug, Clone)]
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    disabled: bool,
}

impl RemoteIdentityProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("http client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn verify(&self, credential: &str) -> Result<Identity, ProviderError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&LookupRequest { id_token: credential })
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("identity provider request failed: {e}")))?;

        let status = response.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::Unavailable(format!(
                "identity provider answered {status}"
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::InvalidCredential(format!(
                "identity provider rejected credential ({status})"
            )));
        }

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Unavailable(format!("malformed provider response: {e}")))?;

        let Some(user) = body.users.into_iter().next() else {
            return Err(ProviderError::InvalidCredential("no account for credential".to_string()));
        };
        if user.disabled {
            return Err(ProviderError::InvalidCredential("account disabled at provider".to_string()));
        }

        let uid = UserId::new(user.local_id)
            .map_err(|e| ProviderError::Unavailable(format!("provider returned bad uid: {e}")))?;

        Ok(Identity {
            uid,
            email: user.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::header, routing::post, Json, Router};

    use super::*;

    /// A lookup endpoint that accepts `good-token` only and otherwise answers
    /// with the given status and JSON body.
    async fn spawn_lookup(status: StatusCode, body: &'static str) -> (RemoteIdentityProvider, tokio::task::JoinHandle<()>) {
        let app = Router::new().route(
            "/lookup",
            post(move |Json(req): Json<serde_json::Value>| async move {
                let status = if req["idToken"] == "good-token" {
                    status
                } else {
                    StatusCode::BAD_REQUEST
                };
                (status, [(header::CONTENT_TYPE, "application/json")], body)
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let provider =
            RemoteIdentityProvider::new(format!("http://{addr}/lookup"), Duration::from_secs(2)).unwrap();
        (provider, handle)
    }

    #[tokio::test]
    async fn known_account_yields_identity() {
        let (provider, server) =
            spawn_lookup(StatusCode::OK, r#"{"users":[{"localId":"pia","email":"pia@depth.studio"}]}"#).await;

        let identity = provider.verify("good-token").await.unwrap();
        assert_eq!(identity.uid.as_str(), "pia");
        assert_eq!(identity.email.as_deref(), Some("pia@depth.studio"));
        server.abort();
    }

    #[tokio::test]
    async fn client_errors_are_invalid_credentials() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
        ] {
            let (provider, server) = spawn_lookup(status, r#"{"error":"INVALID_ID_TOKEN"}"#).await;
            let err = provider.verify("good-token").await.unwrap_err();
            assert!(matches!(err, ProviderError::InvalidCredential(_)), "{status} -> {err:?}");
            server.abort();
        }
    }

    #[tokio::test]
    async fn server_errors_are_unavailable() {
        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::SERVICE_UNAVAILABLE,
            StatusCode::TOO_MANY_REQUESTS,
        ] {
            let (provider, server) = spawn_lookup(status, "{}").await;
            let err = provider.verify("good-token").await.unwrap_err();
            assert!(matches!(err, ProviderError::Unavailable(_)), "{status} -> {err:?}");
            server.abort();
        }
    }

    #[tokio::test]
    async fn empty_user_list_is_invalid_credential() {
        let (provider, server) = spawn_lookup(StatusCode::OK, r#"{"users":[]}"#).await;
        let err = provider.verify("good-token").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCredential(_)), "{err:?}");
        server.abort();
    }

    #[tokio::test]
    async fn disabled_account_is_invalid_credential() {
        let (provider, server) =
            spawn_lookup(StatusCode::OK, r#"{"users":[{"localId":"pia","disabled":true}]}"#).await;
        let err = provider.verify("good-token").await.unwrap_err();
        assert_eq!(
            err,
            ProviderError::InvalidCredential("account disabled at provider".to_string())
        );
        server.abort();
    }

    #[tokio::test]
    async fn credential_is_forwarded_as_id_token() {
        let (provider, server) =
            spawn_lookup(StatusCode::OK, r#"{"users":[{"localId":"pia"}]}"#).await;
        let err = provider.verify("other-token").await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCredential(_)), "{err:?}");
        server.abort();
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable_not_invalid() {
        // Port 9 (discard) on loopback is closed in test environments.
        let provider =
            RemoteIdentityProvider::new("http://127.0.0.1:9/lookup", Duration::from_millis(500)).unwrap();

        let err = provider.verify("some-token").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)), "got {err:?}");
    }

    #[test]
    fn lookup_response_parses_provider_shape() {
        let body: LookupResponse = serde_json::from_str(
            r#"{"kind":"identitytoolkit#GetAccountInfoResponse","users":[{"localId":"abc","email":"a@b.co"}]}"#,
        )
        .unwrap();
        assert_eq!(body.users.len(), 1);
        assert_eq!(body.users[0].local_id, "abc");
        assert!(!body.users[0].disabled);
    }
}
