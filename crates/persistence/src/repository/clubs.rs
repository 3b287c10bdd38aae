//! Clubs repository

use crate::DbResult;
use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

/// A football club with its badge images
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
    pub badge_30x30: String,
    pub badge_45x45: String,
    pub badge_60x60: String,
}

pub struct ClubRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ClubRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a club (upsert by id)
    pub async fn upsert(&self, club: &Club) -> DbResult<()> {
        upsert_club(self.pool, club).await
    }

    /// Upsert a batch in one transaction; nothing is written if any row fails
    pub async fn upsert_all(&self, clubs: &[Club]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for club in clubs {
            upsert_club(&mut *tx, club).await?;
        }
        tx.commit().await?;
        Ok(clubs.len())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Club>> {
        let club = sqlx::query_as::<_, Club>(
            r#"SELECT id, name, abbreviation, badge_30x30, badge_45x45, badge_60x60
               FROM clubs WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(club)
    }

    /// All clubs ordered by abbreviation
    pub async fn all(&self) -> DbResult<Vec<Club>> {
        let clubs = sqlx::query_as::<_, Club>(
            r#"SELECT id, name, abbreviation, badge_30x30, badge_45x45, badge_60x60
               FROM clubs ORDER BY abbreviation"#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(clubs)
    }
}

async fn upsert_club<'e, E: SqliteExecutor<'e>>(executor: E, club: &Club) -> DbResult<()> {
    sqlx::query(
        r#"INSERT INTO clubs (id, name, abbreviation, badge_30x30, badge_45x45, badge_60x60)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             abbreviation = excluded.abbreviation,
             badge_30x30 = excluded.badge_30x30,
             badge_45x45 = excluded.badge_45x45,
             badge_60x60 = excluded.badge_60x60
        "#,
    )
    .bind(club.id)
    .bind(&club.name)
    .bind(&club.abbreviation)
    .bind(&club.badge_30x30)
    .bind(&club.badge_45x45)
    .bind(&club.badge_60x60)
    .execute(executor)
    .await?;

    Ok(())
}
