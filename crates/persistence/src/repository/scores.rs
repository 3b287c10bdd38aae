//! Score records repository — per player, per round scoring snapshots

use crate::scout::{ScoutCode, Scouts};
use crate::DbResult;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteExecutor, SqlitePool};
use std::str::FromStr;

/// One player's scoring snapshot for a round, keyed by (year, round, player)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreRecord {
    pub year: i64,
    pub round: i64,
    pub player_id: i64,
    pub club_id: i64,
    pub position_id: i64,
    pub status_id: i64,
    pub score: Decimal,
    pub price: Decimal,
    pub price_delta: Decimal,
    /// Rolling average score
    pub average: Decimal,
    pub games_played: i64,
    pub scouts: Scouts,
}

impl<'r> FromRow<'r, SqliteRow> for ScoreRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut scouts = Scouts::default();
        for code in ScoutCode::ALL {
            scouts.set(code, row.try_get(code.column())?);
        }

        Ok(Self {
            year: row.try_get("year")?,
            round: row.try_get("round")?,
            player_id: row.try_get("player_id")?,
            club_id: row.try_get("club_id")?,
            position_id: row.try_get("position_id")?,
            status_id: row.try_get("status_id")?,
            score: decimal_column(row, "score")?,
            price: decimal_column(row, "price")?,
            price_delta: decimal_column(row, "price_delta")?,
            average: decimal_column(row, "average")?,
            games_played: row.try_get("games_played")?,
            scouts,
        })
    }
}

fn decimal_column(row: &SqliteRow, column: &str) -> Result<Decimal, sqlx::Error> {
    let text: String = row.try_get(column)?;
    Decimal::from_str(&text).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

pub struct ScoreRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ScoreRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Upsert a batch in one transaction, keyed by (year, round, player_id)
    pub async fn upsert_all(&self, records: &[ScoreRecord]) -> DbResult<usize> {
        let sql = upsert_sql();
        let mut tx = self.pool.begin().await?;
        for record in records {
            upsert_record(&mut *tx, &sql, record).await?;
        }
        tx.commit().await?;
        Ok(records.len())
    }

    pub async fn get(&self, year: i64, round: i64, player_id: i64) -> DbResult<Option<ScoreRecord>> {
        let record = sqlx::query_as::<_, ScoreRecord>(
            "SELECT * FROM score_records WHERE year = ?1 AND round = ?2 AND player_id = ?3",
        )
        .bind(year)
        .bind(round)
        .bind(player_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(record)
    }

    /// All records of a round, best score first
    pub async fn for_round(&self, year: i64, round: i64) -> DbResult<Vec<ScoreRecord>> {
        let records = sqlx::query_as::<_, ScoreRecord>(
            r#"SELECT * FROM score_records
               WHERE year = ?1 AND round = ?2
               ORDER BY CAST(score AS REAL) DESC, player_id"#,
        )
        .bind(year)
        .bind(round)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }
}

fn upsert_sql() -> String {
    let scout_columns: Vec<&str> = ScoutCode::ALL.iter().map(|c| c.column()).collect();
    let placeholders = vec!["?"; 11 + scout_columns.len()].join(", ");
    let updates: Vec<String> = [
        "club_id",
        "position_id",
        "status_id",
        "score",
        "price",
        "price_delta",
        "average",
        "games_played",
    ]
    .iter()
    .copied()
    .chain(scout_columns.iter().copied())
    .map(|col| format!("{col} = excluded.{col}"))
    .collect();

    format!(
        r#"INSERT INTO score_records
            (year, round, player_id, club_id, position_id, status_id,
             score, price, price_delta, average, games_played, {})
           VALUES ({})
           ON CONFLICT(year, round, player_id) DO UPDATE SET {}"#,
        scout_columns.join(", "),
        placeholders,
        updates.join(", ")
    )
}

async fn upsert_record<'e, E: SqliteExecutor<'e>>(
    executor: E,
    sql: &str,
    record: &ScoreRecord,
) -> DbResult<()> {
    let mut query = sqlx::query(sql)
        .bind(record.year)
        .bind(record.round)
        .bind(record.player_id)
        .bind(record.club_id)
        .bind(record.position_id)
        .bind(record.status_id)
        .bind(record.score.to_string())
        .bind(record.price.to_string())
        .bind(record.price_delta.to_string())
        .bind(record.average.to_string())
        .bind(record.games_played);
    for (_, count) in record.scouts.iter() {
        query = query.bind(count);
    }
    query.execute(executor).await?;

    Ok(())
}
