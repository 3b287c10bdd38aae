//! HTTP transport seam: one request in, status and body out

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::{TransportError, TransportErrorKind};

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError>;

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(TransportErrorKind::Other, e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, TransportError> {
        debug!(url, "GET");
        let resp = self.client.get(url).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }

    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<RawResponse, TransportError> {
        debug!(url, "POST");
        let resp = self.client.post(url).json(body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::fetch::Fetcher;
    use axum::{http::StatusCode, routing::get, routing::post, Json, Router};
    use serde_json::json;
    use std::sync::Arc;

    fn loopback_transport() -> ReqwestTransport {
        ReqwestTransport::with_client(
            Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
        )
    }

    async fn spawn_upstream() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { Json(json!({"spam": ["eggs", "sausage"]})) }))
            .route(
                "/down",
                get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .route("/echo", post(|Json(body): Json<serde_json::Value>| async move { Json(body) }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_get_success_and_status() {
        let base = spawn_upstream().await;
        let transport = loopback_transport();

        let ok = transport.get(&format!("{base}/ok")).await.unwrap();
        assert!(ok.is_success());
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&ok.body).unwrap(),
            json!({"spam": ["eggs", "sausage"]})
        );

        let down = transport.get(&format!("{base}/down")).await.unwrap();
        assert_eq!(down.status, 503);
        assert_eq!(down.body, "maintenance");
        assert!(!down.is_success());
    }

    #[tokio::test]
    async fn test_post_json() {
        let base = spawn_upstream().await;
        let transport = loopback_transport();

        let resp = transport
            .post_json(&format!("{base}/echo"), &json!({"captcha": ""}))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, r#"{"captcha":""}"#);
    }

    #[tokio::test]
    async fn test_fetcher_over_real_transport() {
        let base = spawn_upstream().await;
        let fetcher = Fetcher::new(Arc::new(loopback_transport()), 3, Duration::ZERO);

        let value = fetcher.fetch(&format!("{base}/ok")).await.unwrap();
        assert_eq!(value["spam"][1], "sausage");

        match fetcher.fetch(&format!("{base}/down")).await {
            Err(IngestError::HttpStatus { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_retryable() {
        // Grab a free port, then close it so nothing is listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = loopback_transport();
        let err = transport.get(&format!("http://{addr}/")).await.unwrap_err();
        assert!(err.is_retryable(), "{err:?}");

        let fetcher = Fetcher::new(Arc::new(transport), 3, Duration::ZERO);
        match fetcher.fetch(&format!("http://{addr}/")).await {
            Err(IngestError::ConnectionExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last.kind, TransportErrorKind::Connect);
            }
            other => panic!("expected ConnectionExhausted, got {other:?}"),
        }
    }
}
