use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::Event;
use crate::services::store::{EventStore, StoreError};

/// PostgreSQL-backed event store
///
/// Discovery reads page through `events` ordered by `(created_at, id)`.
/// The average-age lookup reads the `profiles` and `group_members` tables
/// owned by the profile and membership services.
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL event store");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn fetch_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError> {
        let query = r#"
            SELECT id, title, description, start_time, end_time,
                   latitude, longitude, organizer_id, group_id,
                   post_only_to_group, min_age, max_age, created_at
            FROM events
            WHERE start_time > $1
              AND post_only_to_group = FALSE
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
        "#;

        let events = sqlx::query_as::<_, Event>(query)
            .bind(now)
            .bind(i64::from(limit))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Fetched {} upcoming events (offset {}, limit {})",
            events.len(),
            offset,
            limit
        );

        Ok(events)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO events (
                id, title, description, start_time, end_time,
                latitude, longitude, organizer_id, group_id,
                post_only_to_group, min_age, max_age, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#;

        sqlx::query(query)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.latitude)
            .bind(event.longitude)
            .bind(&event.organizer_id)
            .bind(event.group_id)
            .bind(event.post_only_to_group)
            .bind(event.min_age)
            .bind(event.max_age)
            .bind(event.created_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!("Inserted event {} for organizer {}", event.id, event.organizer_id);

        Ok(())
    }

    async fn group_average_age(&self, group_id: Uuid) -> Result<Option<f64>, StoreError> {
        let query = r#"
            SELECT AVG(p.age)::DOUBLE PRECISION AS average_age
            FROM group_members gm
            JOIN profiles p ON p.user_id = gm.user_id
            WHERE gm.group_id = $1
              AND p.age IS NOT NULL
        "#;

        let row = sqlx::query(query)
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("average_age")?)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
