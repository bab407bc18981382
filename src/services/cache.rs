use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::services::store::{EventStore, StoreError};

/// In-process cache for group average-age lookups
///
/// Group membership changes slowly compared with how often events are
/// posted, so lookups are held for a TTL. A group with no known member ages
/// is cached as `None` as well.
#[derive(Clone)]
pub struct AverageAgeCache {
    cache: moka::future::Cache<Uuid, Option<f64>>,
}

impl AverageAgeCache {
    /// Create a new cache
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { cache }
    }

    /// Get a group's average age, loading it from the store on a miss
    pub async fn get_or_load(
        &self,
        group_id: Uuid,
        store: &Arc<dyn EventStore>,
    ) -> Result<Option<f64>, StoreError> {
        if let Some(average) = self.cache.get(&group_id).await {
            tracing::trace!("Average age cache hit: {}", group_id);
            return Ok(average);
        }

        tracing::trace!("Average age cache miss: {}", group_id);
        let average = store.group_average_age(group_id).await?;
        self.cache.insert(group_id, average).await;

        Ok(average)
    }
}

impl std::fmt::Debug for AverageAgeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AverageAgeCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}
