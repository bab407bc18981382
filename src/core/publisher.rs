use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::core::age_band::{AgeBandError, AgeBandPolicy};
use crate::models::{CreateEventRequest, Event};
use crate::services::{AverageAgeCache, EventStore, StoreError};

/// Errors from publishing an event
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    InvalidInput(#[from] AgeBandError),

    #[error("Failed to store event: {0}")]
    Store(#[from] StoreError),
}

/// Event-creation flow
///
/// Derives the age band exactly once, from the group's average member age
/// (or `default_average_age` for group-less events), and persists it with
/// the event. The band is never recomputed afterwards.
#[derive(Clone)]
pub struct EventPublisher {
    store: Arc<dyn EventStore>,
    average_ages: AverageAgeCache,
    policy: AgeBandPolicy,
    default_average_age: f64,
}

impl EventPublisher {
    pub fn new(
        store: Arc<dyn EventStore>,
        average_ages: AverageAgeCache,
        policy: AgeBandPolicy,
        default_average_age: f64,
    ) -> Self {
        Self {
            store,
            average_ages,
            policy,
            default_average_age,
        }
    }

    pub async fn publish(&self, request: &CreateEventRequest) -> Result<Event, PublishError> {
        self.publish_at(request, Utc::now()).await
    }

    /// Validate, derive the age band, and persist a new event
    pub async fn publish_at(
        &self,
        request: &CreateEventRequest,
        now: DateTime<Utc>,
    ) -> Result<Event, PublishError> {
        validate_request(request)?;

        let average_age = self.resolve_average_age(request.group_id).await?;
        let band = self.policy.derive(average_age)?;

        let event = Event {
            id: Uuid::new_v4(),
            title: request.title.trim().to_string(),
            description: request.description.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            latitude: request.latitude,
            longitude: request.longitude,
            organizer_id: request.organizer_id.clone(),
            group_id: request.group_id,
            post_only_to_group: request.post_only_to_group,
            min_age: None,
            max_age: None,
            created_at: now,
        }
        .with_age_band(band);

        self.store.insert_event(&event).await?;

        tracing::info!(
            "Published event {} by {} with age band [{}, {}] (average age {:.1})",
            event.id,
            event.organizer_id,
            band.min_age,
            band.max_age,
            average_age
        );

        Ok(event)
    }

    async fn resolve_average_age(&self, group_id: Option<Uuid>) -> Result<f64, StoreError> {
        let Some(group_id) = group_id else {
            return Ok(self.default_average_age);
        };

        match self.average_ages.get_or_load(group_id, &self.store).await? {
            Some(average) => Ok(average),
            None => {
                tracing::debug!(
                    "Group {} has no known member ages, using default {}",
                    group_id,
                    self.default_average_age
                );
                Ok(self.default_average_age)
            }
        }
    }
}

fn validate_request(request: &CreateEventRequest) -> Result<(), PublishError> {
    request
        .validate()
        .map_err(|errors| PublishError::Validation(errors.to_string()))?;

    if request.title.trim().is_empty() {
        return Err(PublishError::Validation("title must not be blank".to_string()));
    }
    if request.start_time >= request.end_time {
        return Err(PublishError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    if request.latitude.is_some() != request.longitude.is_some() {
        return Err(PublishError::Validation(
            "latitude and longitude must be given together".to_string(),
        ));
    }

    Ok(())
}

impl std::fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventPublisher")
            .field("policy", &self.policy)
            .field("default_average_age", &self.default_average_age)
            .finish()
    }
}
