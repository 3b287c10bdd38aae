//! JSON fetch helper with bounded retry on connection failures

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{IngestError, IngestResult, TransportError};
use crate::http::{HttpTransport, RawResponse};

/// GETs JSON documents, retrying transport failures but never HTTP status failures
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            transport,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Connection errors and timeouts are retried up to `max_attempts` in total, then
    /// reported as [`IngestError::ConnectionExhausted`]. A non-2xx status fails at once
    /// with [`IngestError::HttpStatus`] and the body is not decoded.
    pub async fn fetch(&self, url: &str) -> IngestResult<Value> {
        let mut last: Option<TransportError> = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }

            debug!(url, attempt, "Fetching");
            match self.transport.get(url).await {
                Ok(resp) => return decode(resp),
                Err(e) if e.is_retryable() => {
                    warn!(url, attempt, max_attempts = self.max_attempts, error = %e, "Request failed");
                    last = Some(e);
                }
                Err(e) => return Err(IngestError::Transport(e)),
            }
        }

        Err(IngestError::ConnectionExhausted {
            attempts: self.max_attempts,
            last: last.unwrap_or_else(|| {
                TransportError::new(crate::error::TransportErrorKind::Other, "no attempt made")
            }),
        })
    }

    /// POST a JSON body once (no retry) and decode the JSON reply
    pub async fn post(&self, url: &str, body: &Value) -> IngestResult<Value> {
        debug!(url, "Posting");
        let resp = self
            .transport
            .post_json(url, body)
            .await
            .map_err(IngestError::Transport)?;
        decode(resp)
    }
}

fn decode(resp: RawResponse) -> IngestResult<Value> {
    if !resp.is_success() {
        return Err(IngestError::HttpStatus {
            status: resp.status,
            body: resp.body,
        });
    }
    Ok(serde_json::from_str(&resp.body)?)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::error::TransportErrorKind;
    use serde_json::json;

    const URL: &str = "http://api.spam.com/eggs/";

    fn spam() -> Value {
        json!({"spam": ["eggs", "sausage"]})
    }

    #[tokio::test]
    async fn test_fetch_success_single_attempt() {
        let transport = ScriptedTransport::new(vec![json_reply(spam())]);

        let value = fetcher(&transport).fetch(URL).await.unwrap();

        assert_eq!(value, spam());
        assert_eq!(transport.gets(), vec![URL]);
    }

    #[tokio::test]
    async fn test_http_error_not_retried_nor_decoded() {
        // Body is not JSON: a decode attempt would surface as Deserialization
        let transport = ScriptedTransport::new(vec![status_reply(500, "<html>oops</html>")]);

        let err = fetcher(&transport).fetch(URL).await.unwrap_err();

        match err {
            IngestError::HttpStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
        assert_eq!(transport.gets().len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_connection_error_exhausts_three_attempts() {
        let transport =
            ScriptedTransport::new(vec![connect_error(), connect_error(), connect_error()]);

        let err = fetcher(&transport).fetch(URL).await.unwrap_err();

        match err {
            IngestError::ConnectionExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert_eq!(last.kind, TransportErrorKind::Connect);
            }
            other => panic!("expected ConnectionExhausted, got {other:?}"),
        }
        assert_eq!(transport.gets(), vec![URL; 3]);
    }

    #[tokio::test]
    async fn test_connection_errors_then_success() {
        let transport =
            ScriptedTransport::new(vec![connect_error(), timeout_error(), json_reply(spam())]);

        let value = fetcher(&transport).fetch(URL).await.unwrap();

        assert_eq!(value, spam());
        assert_eq!(transport.gets(), vec![URL; 3]);
    }

    #[tokio::test]
    async fn test_success_stops_further_attempts() {
        let transport = ScriptedTransport::new(vec![
            connect_error(),
            json_reply(spam()),
            json_reply(json!({"unused": true})),
        ]);

        fetcher(&transport).fetch(URL).await.unwrap();

        assert_eq!(transport.gets().len(), 2);
    }

    #[tokio::test]
    async fn test_connection_error_then_http_error() {
        let transport = ScriptedTransport::new(vec![connect_error(), status_reply(404, "")]);

        let err = fetcher(&transport).fetch(URL).await.unwrap_err();

        assert!(matches!(err, IngestError::HttpStatus { status: 404, .. }));
        assert_eq!(transport.gets(), vec![URL; 2]);
    }

    #[tokio::test]
    async fn test_malformed_json_is_deserialization_error() {
        let transport = ScriptedTransport::new(vec![status_reply(200, "{not json")]);

        let err = fetcher(&transport).fetch(URL).await.unwrap_err();

        assert!(matches!(err, IngestError::Deserialization(_)));
        assert_eq!(transport.gets().len(), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_transport_error_fails_fast() {
        let transport = ScriptedTransport::new(vec![Err(TransportError::new(
            TransportErrorKind::Other,
            "builder error",
        ))]);

        let err = fetcher(&transport).fetch(URL).await.unwrap_err();

        assert!(matches!(err, IngestError::Transport(_)));
        assert_eq!(transport.gets().len(), 1);
    }

    #[tokio::test]
    async fn test_attempt_budget_is_configurable() {
        let transport = ScriptedTransport::new(vec![connect_error(), connect_error()]);
        let fetcher = Fetcher::new(transport.clone(), 2, Duration::ZERO);

        let err = fetcher.fetch(URL).await.unwrap_err();

        assert!(matches!(err, IngestError::ConnectionExhausted { attempts: 2, .. }));
        assert_eq!(transport.gets().len(), 2);
    }

    #[tokio::test]
    async fn test_post_is_single_attempt() {
        let transport = ScriptedTransport::new(vec![connect_error()]);

        let err = fetcher(&transport)
            .post(URL, &json!({"captcha": ""}))
            .await
            .unwrap_err();

        assert!(matches!(err, IngestError::Transport(_)));
        assert_eq!(transport.posts().len(), 1);
    }
}
