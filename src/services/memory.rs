use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Event;
use crate::services::store::{EventStore, StoreError};

/// In-process event store for local development, tests and benches
///
/// Keeps events sorted by `(created_at, id)` so offsets behave like the
/// PostgreSQL store's `ORDER BY created_at, id`.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
    member_ages: RwLock<HashMap<Uuid, Vec<i32>>>,
    fetch_calls: AtomicUsize,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with events
    pub fn with_events(events: Vec<Event>) -> Self {
        let mut events = events;
        events.sort_by(|a, b| order_key(a).cmp(&order_key(b)));

        Self {
            events: RwLock::new(events),
            ..Self::default()
        }
    }

    /// Record a group member's age for average-age lookups
    pub async fn add_group_member(&self, group_id: Uuid, age: i32) {
        self.member_ages
            .write()
            .await
            .entry(group_id)
            .or_default()
            .push(age);
    }

    /// Number of `fetch_upcoming` calls served so far
    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[inline]
fn order_key(event: &Event) -> (DateTime<Utc>, Uuid) {
    (event.created_at, event.id)
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn fetch_upcoming(
        &self,
        now: DateTime<Utc>,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<Event>, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);

        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);

        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|event| event.start_time > now && !event.post_only_to_group)
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        let key = order_key(event);
        let position = events.partition_point(|existing| order_key(existing) <= key);
        events.insert(position, event.clone());
        Ok(())
    }

    async fn group_average_age(&self, group_id: Uuid) -> Result<Option<f64>, StoreError> {
        let member_ages = self.member_ages.read().await;
        Ok(member_ages
            .get(&group_id)
            .filter(|ages| !ages.is_empty())
            .map(|ages| {
                let total: f64 = ages.iter().map(|&age| f64::from(age)).sum();
                total / ages.len() as f64
            }))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
