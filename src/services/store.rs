use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Event;

/// Errors that can occur when reading from or writing to the event store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Event store unavailable: {0}")]
    Unavailable(String),
}

/// The event store collaborator
///
/// `fetch_upcoming` must return rows in a stable order keyed on
/// `(created_at, id)`, both immutable after insert. Offsets are positions in
/// that order among events matching the filter at call time, so rows that
/// are inserted, or start, between two calls shift later offsets. Callers
/// paging across requests may see a duplicate or a skip; that is accepted.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Up to `limit` events with `start_time > now` and
    /// `post_only_to_group = false`, starting at `offset`
    async fn fetch_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError>;

    /// Persist a newly created event
    async fn insert_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Average age of a group's members, `None` when no member age is known
    async fn group_average_age(&self, group_id: Uuid) -> Result<Option<f64>, StoreError>;

    /// Connectivity check for the health endpoint
    async fn health_check(&self) -> Result<bool, StoreError>;
}
