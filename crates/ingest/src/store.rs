//! Read-side store capability used to resolve foreign keys while mapping

use async_trait::async_trait;
use persistence::{Club, Database, Player, Position, Status};

use crate::error::{IngestError, IngestResult};

/// Primary-key lookups against already-persisted records
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn club(&self, id: i64) -> IngestResult<Option<Club>>;
    async fn player(&self, id: i64) -> IngestResult<Option<Player>>;
    async fn position(&self, id: i64) -> IngestResult<Option<Position>>;
    async fn status(&self, id: i64) -> IngestResult<Option<Status>>;
}

#[async_trait]
impl RecordStore for Database {
    async fn club(&self, id: i64) -> IngestResult<Option<Club>> {
        Ok(self.clubs().get(id).await?)
    }

    async fn player(&self, id: i64) -> IngestResult<Option<Player>> {
        Ok(self.players().get_player(id).await?)
    }

    async fn position(&self, id: i64) -> IngestResult<Option<Position>> {
        Ok(self.players().get_position(id).await?)
    }

    async fn status(&self, id: i64) -> IngestResult<Option<Status>> {
        Ok(self.players().get_status(id).await?)
    }
}

/// Resolve a foreign key or fail the whole mapping call
pub(crate) async fn require<T>(
    lookup: impl std::future::Future<Output = IngestResult<Option<T>>>,
    entity: &'static str,
    id: i64,
) -> IngestResult<T> {
    lookup
        .await?
        .ok_or(IngestError::ForeignKeyNotFound { entity, id })
}
