//! Full ingestion pass: map each entity family and persist it before its dependents

use persistence::Database;
use serde::Serialize;
use tracing::info;

use crate::api::CartolaClient;
use crate::error::IngestResult;

/// Rows written per entity by one [`sync_round`] call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub round: i64,
    pub clubs: usize,
    pub players: usize,
    pub positions: usize,
    pub statuses: usize,
    pub matches: usize,
    pub score_records: usize,
}

/// Ingest clubs, the market catalogs, the fixtures of `round` and the market's score
/// records, in that order. `report.round` is the round the upstream reported for the
/// fixtures, which may differ from `round`.
///
/// Each batch is committed in its own transaction; a failure stops the pass and leaves
/// earlier batches in place.
pub async fn sync_round(client: &CartolaClient, db: &Database, round: i64) -> IngestResult<SyncReport> {
    let mut report = SyncReport {
        round,
        ..Default::default()
    };

    let clubs = client.clubs().await?;
    report.clubs = db.clubs().upsert_all(&clubs).await?;

    let market = client.fetch_market().await?;
    let players = db.players();
    report.positions = players.upsert_positions(&client.positions_from(&market)?).await?;
    report.statuses = players.upsert_statuses(&client.statuses_from(&market)?).await?;
    report.players = players.upsert_players(&client.players_from(&market)?).await?;

    let fixtures = client.fixtures(round).await?;
    report.round = fixtures.round;
    report.matches = db.matches().upsert_all(&fixtures.matches).await?;

    let records = client.score_records_from(&market).await?;
    report.score_records = db.scores().upsert_all(&records).await?;

    info!(
        round = report.round,
        clubs = report.clubs,
        players = report.players,
        matches = report.matches,
        score_records = report.score_records,
        "Sync complete"
    );
    Ok(report)
}
