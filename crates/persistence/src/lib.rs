//! Persistence layer for Cartola ingest
//!
//! SQLite storage for clubs, matches, players, positions, statuses and
//! per-round score records.

pub mod repository;
pub mod schema;
pub mod scout;

pub use repository::*;
pub use scout::{ScoutCode, Scouts, UnknownScoutCode};
pub use sqlx::sqlite::SqlitePool;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection pool
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database file at `path` and apply the schema
    pub async fn new(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| DbError::Connection(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection(e.to_string()))?
            .foreign_keys(true);

        // One connection: every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        let db = Self { pool };
        db.run_migrations().await?;

        Ok(db)
    }

    /// Run database migrations (execute each statement individually)
    async fn run_migrations(&self) -> DbResult<()> {
        for statement in schema::CREATE_TABLES.split(';') {
            let sql: String = statement
                .lines()
                .filter(|line| !line.trim().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n");
            let sql = sql.trim();
            if sql.is_empty() {
                continue;
            }
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| DbError::Migration(format!("{e}: {sql}")))?;
        }

        debug!("Schema applied");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn clubs(&self) -> ClubRepository<'_> {
        ClubRepository::new(&self.pool)
    }

    pub fn matches(&self) -> MatchRepository<'_> {
        MatchRepository::new(&self.pool)
    }

    pub fn players(&self) -> PlayerRepository<'_> {
        PlayerRepository::new(&self.pool)
    }

    pub fn scores(&self) -> ScoreRepository<'_> {
        ScoreRepository::new(&self.pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_schema_is_applied() {
        let db = Database::in_memory().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(db.pool())
        .await
        .unwrap();
        let names: Vec<String> = tables.into_iter().map(|(n,)| n).collect();

        assert_eq!(
            names,
            vec!["clubs", "matches", "players", "positions", "score_records", "statuses"]
        );
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let db = Database::in_memory().await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_file_database_reopens() {
        let dir = std::env::temp_dir().join(format!("cartola-db-{}", std::process::id()));
        let path = dir.join("reopen.db");

        {
            let db = Database::new(&path).await.unwrap();
            db.clubs()
                .upsert(&Club {
                    id: 262,
                    name: "Flamengo".into(),
                    abbreviation: "FLA".into(),
                    badge_30x30: String::new(),
                    badge_45x45: String::new(),
                    badge_60x60: String::new(),
                })
                .await
                .unwrap();
            db.pool().close().await;
        }

        let db = Database::new(&path).await.unwrap();
        let club = db.clubs().get(262).await.unwrap();
        assert_eq!(club.map(|c| c.abbreviation), Some("FLA".to_string()));

        db.pool().close().await;
        std::fs::remove_dir_all(&dir).ok();
    }
}
