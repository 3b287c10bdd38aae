use persistence::{DbError, UnknownScoutCode};
use std::fmt;
use thiserror::Error;

/// What went wrong below the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportErrorKind::Connect => f.write_str("connection error"),
            TransportErrorKind::Timeout => f.write_str("timeout"),
            TransportErrorKind::Other => f.write_str("transport error"),
        }
    }
}

/// A request that never produced an HTTP response
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Connection failures and timeouts are worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::Connect | TransportErrorKind::Timeout
        )
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Transport(TransportError),

    #[error("gave up after {attempts} attempts: {last}")]
    ConnectionExhausted {
        attempts: u32,
        #[source]
        last: TransportError,
    },

    #[error("upstream returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("JSON decode error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{entity} {id} not found in store")]
    ForeignKeyNotFound { entity: &'static str, id: i64 },

    #[error(transparent)]
    UnknownScoutCode(#[from] UnknownScoutCode),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Store(#[from] DbError),
}

pub type IngestResult<T> = Result<T, IngestError>;
