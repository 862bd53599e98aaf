use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::model::{
    Account, AnalyticsSeries, BackendRequest, BackendResult, MALFORMED, UNREACHABLE, classify,
};
use crate::config::BackendConfig;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Account API used by the dashboard.
///
/// Mutating calls never fail at this level: transport errors are folded into
/// [`BackendResult::Failure`] so every workflow ends in a presentation.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn call(&self, request: &BackendRequest) -> BackendResult;

    async fn account(&self) -> Result<Account, BackendError>;

    async fn analytics(&self) -> Result<AnalyticsSeries, BackendError>;
}

/// [`Backend`] over HTTP with reqwest.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
    access_code: Option<String>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| BackendError::InvalidUrl {
            url: config.base_url.clone(),
            reason: err.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url,
            access_code: config.access_code.clone(),
        })
    }

    fn url(&self, path: &str) -> Url {
        // Paths are absolute, so they replace any path on the base URL.
        self.base_url.join(path).unwrap_or_else(|_| self.base_url.clone())
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_code {
            Some(code) => builder.bearer_auth(code),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let response = self
            .authorize(self.client.get(self.url(path)))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn call(&self, request: &BackendRequest) -> BackendResult {
        let mut builder = self.authorize(self.client.post(self.url(request.path())));
        if let Some(body) = request.body() {
            builder = builder.json(&body);
        }

        debug!(path = request.path(), "Calling backend to {}", request.describe());
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Failed to {}", request.describe());
                return BackendResult::Failure(UNREACHABLE.to_string());
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(err) => {
                warn!(error = %err, "Failed to read response to {}", request.describe());
                return BackendResult::Failure(UNREACHABLE.to_string());
            }
        };
        if body.is_none() {
            warn!(%status, "Non-JSON response to {}", request.describe());
            return BackendResult::Failure(MALFORMED.to_string());
        }

        classify(status, body, request)
    }

    async fn account(&self) -> Result<Account, BackendError> {
        self.get_json("/api/account").await
    }

    async fn analytics(&self) -> Result<AnalyticsSeries, BackendError> {
        self.get_json("/api/data").await
    }
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use serde_json::json;

    use super::*;
    use crate::backend::model::Payload;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn backend(base_url: String, access_code: Option<&str>) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            base_url,
            timeout_secs: 5,
            access_code: access_code.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_server_success() {
        let router = Router::new().route(
            "/api/create_server",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "status": "success",
                    "owned_server": body["server_id"],
                    "secret_key": "abc123"
                }))
            }),
        );
        let backend = backend(serve(router).await, None);

        let result = backend
            .call(&BackendRequest::CreateServer {
                server_id: "test-box".into(),
            })
            .await;

        let BackendResult::Success(payload) = result else {
            panic!("expected success");
        };
        assert_eq!(payload.str("owned_server"), Some("test-box"));
        assert_eq!(payload.str("secret_key"), Some("abc123"));
    }

    #[tokio::test]
    async fn test_application_error_is_failure() {
        let router = Router::new().route(
            "/api/delete_server",
            post(|| async { Json(json!({"status": "error", "message": "no server"})) }),
        );
        let backend = backend(serve(router).await, None);

        assert_eq!(
            backend.call(&BackendRequest::DeleteServer).await,
            BackendResult::Failure("no server".into())
        );
    }

    #[tokio::test]
    async fn test_non_json_error_page() {
        let router = Router::new().route(
            "/api/reset_server_code",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "<h1>oops</h1>") }),
        );
        let backend = backend(serve(router).await, None);

        assert_eq!(
            backend.call(&BackendRequest::ResetServerCode).await,
            BackendResult::Failure(MALFORMED.into())
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = backend(format!("http://{addr}"), None);

        assert_eq!(
            backend.call(&BackendRequest::ResetAccessCode).await,
            BackendResult::Failure(UNREACHABLE.into())
        );
    }

    #[tokio::test]
    async fn test_access_code_sent_as_bearer() {
        let router = Router::new().route(
            "/api/reset_key",
            post(|headers: HeaderMap| async move {
                let authorized = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    == Some("Bearer letmein");
                if authorized {
                    Json(json!({"status": "success", "api_key": "new-key"}))
                } else {
                    Json(json!({"status": "error"}))
                }
            }),
        );
        let backend = backend(serve(router).await, Some("letmein"));

        let result = backend.call(&BackendRequest::ResetAccessCode).await;
        assert_eq!(
            result,
            BackendResult::Success(Payload::new(
                json!({"status": "success", "api_key": "new-key"})
                    .as_object()
                    .cloned()
                    .unwrap()
            ))
        );
    }

    #[tokio::test]
    async fn test_reads_series_and_account() {
        let router = Router::new()
            .route(
                "/api/data",
                get(|| async { Json(json!({"labels": ["Jan 01", "Jan 02"], "values": [10, 20]})) }),
            )
            .route(
                "/api/account",
                get(|| async { Json(json!({"username": "steve", "owned_server": "test-box"})) }),
            );
        let backend = backend(serve(router).await, None);

        let series = backend.analytics().await.unwrap();
        assert_eq!(series.labels, vec!["Jan 01", "Jan 02"]);
        assert_eq!(series.values, vec![10.0, 20.0]);

        let account = backend.account().await.unwrap();
        assert_eq!(account.username, "steve");
        assert_eq!(account.owned_server.as_deref(), Some("test-box"));
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let result = HttpBackend::new(&BackendConfig {
            base_url: "not a url".into(),
            ..BackendConfig::default()
        });
        assert!(matches!(result, Err(BackendError::InvalidUrl { .. })));
    }
}
