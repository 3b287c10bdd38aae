//! Matches repository — fixtures between two persisted clubs

use crate::DbResult;
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

/// A fixture in a given round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Match {
    /// Row id, assigned on insert
    pub id: Option<i64>,
    pub round: i64,
    pub home_club_id: i64,
    pub away_club_id: i64,
    /// League standing at kickoff
    pub home_position: i64,
    pub away_position: i64,
    /// Recent results, one char per game (`v` win, `e` draw, `d` loss)
    pub home_form: String,
    pub away_form: String,
    /// Official score, absent until the match is played
    pub home_score: Option<i64>,
    pub away_score: Option<i64>,
    pub kickoff: NaiveDateTime,
    pub venue: String,
    /// Whether the match counts for scoring
    pub valid: bool,
    pub detail_url: String,
}

pub struct MatchRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> MatchRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a match, keyed by (round, home, away). Returns the row id.
    pub async fn upsert(&self, m: &Match) -> DbResult<i64> {
        upsert_match(self.pool, m).await
    }

    /// Upsert a batch in one transaction
    pub async fn upsert_all(&self, matches: &[Match]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for m in matches {
            upsert_match(&mut *tx, m).await?;
        }
        tx.commit().await?;
        Ok(matches.len())
    }

    pub async fn get(&self, id: i64) -> DbResult<Option<Match>> {
        let m = sqlx::query_as::<_, Match>("SELECT * FROM matches WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(m)
    }

    /// Matches of a round ordered by kickoff
    pub async fn for_round(&self, round: i64) -> DbResult<Vec<Match>> {
        let matches = sqlx::query_as::<_, Match>(
            "SELECT * FROM matches WHERE round = ?1 ORDER BY kickoff, id",
        )
        .bind(round)
        .fetch_all(self.pool)
        .await?;

        Ok(matches)
    }
}

async fn upsert_match<'e, E: SqliteExecutor<'e>>(executor: E, m: &Match) -> DbResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"INSERT INTO matches
            (round, home_club_id, away_club_id, home_position, away_position,
             home_form, away_form, home_score, away_score, kickoff, venue, valid, detail_url)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
           ON CONFLICT(round, home_club_id, away_club_id) DO UPDATE SET
             home_position = excluded.home_position,
             away_position = excluded.away_position,
             home_form = excluded.home_form,
             away_form = excluded.away_form,
             home_score = excluded.home_score,
             away_score = excluded.away_score,
             kickoff = excluded.kickoff,
             venue = excluded.venue,
             valid = excluded.valid,
             detail_url = excluded.detail_url
           RETURNING id
        "#,
    )
    .bind(m.round)
    .bind(m.home_club_id)
    .bind(m.away_club_id)
    .bind(m.home_position)
    .bind(m.away_position)
    .bind(&m.home_form)
    .bind(&m.away_form)
    .bind(m.home_score)
    .bind(m.away_score)
    .bind(m.kickoff)
    .bind(&m.venue)
    .bind(m.valid)
    .bind(&m.detail_url)
    .fetch_one(executor)
    .await?;

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Club, Database};
    use chrono::NaiveDate;

    fn club(id: i64, abbreviation: &str) -> Club {
        Club {
            id,
            name: abbreviation.to_string(),
            abbreviation: abbreviation.to_string(),
            badge_30x30: String::new(),
            badge_45x45: String::new(),
            badge_60x60: String::new(),
        }
    }

    fn derby() -> Match {
        Match {
            id: None,
            round: 4,
            home_club_id: 262,
            away_club_id: 263,
            home_position: 4,
            away_position: 7,
            home_form: "vdeev".into(),
            away_form: "evvee".into(),
            home_score: None,
            away_score: None,
            kickoff: NaiveDate::from_ymd_opt(2017, 6, 4)
                .unwrap()
                .and_hms_opt(11, 0, 0)
                .unwrap(),
            venue: "Raulino de Oliveira".into(),
            valid: true,
            detail_url: "http://globoesporte.globo.com/rj/futebol/brasileirao-serie-a/jogo/04-06-2017/flamengo-botafogo".into(),
        }
    }

    #[tokio::test]
    async fn test_requires_existing_clubs() {
        let db = Database::in_memory().await.unwrap();
        assert!(db.matches().upsert(&derby()).await.is_err());
    }

    #[tokio::test]
    async fn test_reingest_overwrites_same_fixture() {
        let db = Database::in_memory().await.unwrap();
        db.clubs()
            .upsert_all(&[club(262, "FLA"), club(263, "BOT")])
            .await
            .unwrap();

        let repo = db.matches();
        let first_id = repo.upsert(&derby()).await.unwrap();

        let played = Match {
            home_score: Some(2),
            away_score: Some(1),
            ..derby()
        };
        let second_id = repo.upsert(&played).await.unwrap();
        assert_eq!(first_id, second_id);

        let stored = repo.for_round(4).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0],
            Match {
                id: Some(first_id),
                ..played
            }
        );
        assert_eq!(repo.get(first_id).await.unwrap(), Some(stored[0].clone()));
    }
}
