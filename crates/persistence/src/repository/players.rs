//! Players repository — athletes plus the position and status catalogs

use crate::DbResult;
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Player {
    pub id: i64,
    pub name: String,
    /// Display name
    pub nickname: String,
    pub photo: String,
}

/// Tactical role, e.g. goalkeeper (`gol`)
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Position {
    pub id: i64,
    pub name: String,
    pub abbreviation: String,
}

/// Availability for the upcoming round, e.g. doubtful or suspended
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Status {
    pub id: i64,
    pub name: String,
}

pub struct PlayerRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PlayerRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn upsert_players(&self, players: &[Player]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for player in players {
            upsert_player(&mut *tx, player).await?;
        }
        tx.commit().await?;
        Ok(players.len())
    }

    pub async fn upsert_positions(&self, positions: &[Position]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for position in positions {
            sqlx::query(
                r#"INSERT INTO positions (id, name, abbreviation) VALUES (?1, ?2, ?3)
                   ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     abbreviation = excluded.abbreviation
                "#,
            )
            .bind(position.id)
            .bind(&position.name)
            .bind(&position.abbreviation)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(positions.len())
    }

    pub async fn upsert_statuses(&self, statuses: &[Status]) -> DbResult<usize> {
        let mut tx = self.pool.begin().await?;
        for status in statuses {
            sqlx::query(
                r#"INSERT INTO statuses (id, name) VALUES (?1, ?2)
                   ON CONFLICT(id) DO UPDATE SET name = excluded.name
                "#,
            )
            .bind(status.id)
            .bind(&status.name)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(statuses.len())
    }

    pub async fn get_player(&self, id: i64) -> DbResult<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(
            "SELECT id, name, nickname, photo FROM players WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(player)
    }

    pub async fn get_position(&self, id: i64) -> DbResult<Option<Position>> {
        let position = sqlx::query_as::<_, Position>(
            "SELECT id, name, abbreviation FROM positions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(position)
    }

    pub async fn get_status(&self, id: i64) -> DbResult<Option<Status>> {
        let status = sqlx::query_as::<_, Status>("SELECT id, name FROM statuses WHERE id = ?1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(status)
    }

    pub async fn count_players(&self) -> DbResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM players")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

async fn upsert_player<'e, E: SqliteExecutor<'e>>(executor: E, player: &Player) -> DbResult<()> {
    sqlx::query(
        r#"INSERT INTO players (id, name, nickname, photo) VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             nickname = excluded.nickname,
             photo = excluded.photo
        "#,
    )
    .bind(player.id)
    .bind(&player.name)
    .bind(&player.nickname)
    .bind(&player.photo)
    .execute(executor)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn test_catalogs_roundtrip() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.players();

        let player = Player {
            id: 37788,
            name: "Diego Ribas da Cunha".into(),
            nickname: "Diego".into(),
            photo: "https://s.glbimg.com/es/sde/f/2017/03/29/diego_FORMATO.png".into(),
        };
        let position = Position {
            id: 4,
            name: "Meia".into(),
            abbreviation: "mei".into(),
        };
        let status = Status {
            id: 2,
            name: "Dúvida".into(),
        };

        assert_eq!(repo.upsert_players(&[player.clone()]).await.unwrap(), 1);
        repo.upsert_positions(&[position.clone()]).await.unwrap();
        repo.upsert_statuses(&[status.clone()]).await.unwrap();

        assert_eq!(repo.get_player(37788).await.unwrap(), Some(player));
        assert_eq!(repo.get_position(4).await.unwrap(), Some(position));
        assert_eq!(repo.get_status(2).await.unwrap(), Some(status));
        assert_eq!(repo.get_status(7).await.unwrap(), None);
        assert_eq!(repo.count_players().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_status_overwrite() {
        let db = Database::in_memory().await.unwrap();
        let repo = db.players();

        repo.upsert_statuses(&[Status { id: 3, name: "Suspenso".into() }])
            .await
            .unwrap();
        repo.upsert_statuses(&[Status { id: 3, name: "Suspended".into() }])
            .await
            .unwrap();

        assert_eq!(
            repo.get_status(3).await.unwrap().map(|s| s.name),
            Some("Suspended".to_string())
        );
    }
}
