//! Upstream API clients

pub mod cartola;

pub use cartola::{CartolaClient, MarketPayload, RoundFixtures};
