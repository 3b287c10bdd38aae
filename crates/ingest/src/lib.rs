//! Cartola ingest — CartolaFC API client and record mapping
//!
//! Provides:
//! - JSON fetch helper with bounded retry on connection failures
//! - Mappers from upstream payloads to club, match, player, position, status and
//!   score records, resolving foreign keys through an injected store
//! - A sync pass that persists every entity family in dependency order

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod store;
pub mod sync;

// Re-exports for convenience
pub use api::{CartolaClient, MarketPayload, RoundFixtures};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::IngestConfig;
pub use error::{IngestError, IngestResult, TransportError, TransportErrorKind};
pub use fetch::Fetcher;
pub use http::{HttpTransport, RawResponse, ReqwestTransport};
pub use store::RecordStore;
pub use sync::{sync_round, SyncReport};
