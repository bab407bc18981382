use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::models::domain::CallerContext;

/// Oldest caller age accepted on a ranking request
pub const MAX_CALLER_AGE: f64 = 150.0;

/// Why a ranking request carries no usable caller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CallerError {
    #[error("Missing required parameters")]
    Missing,

    #[error("Invalid userAge: {0}")]
    InvalidAge(f64),
}

/// Request for a page of ranked events
///
/// The caller fields are optional at the serde level so that a missing field
/// surfaces as a validation error rather than a JSON parse error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankEventsRequest {
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
    #[serde(default, rename = "userLatitude")]
    pub user_latitude: Option<f64>,
    #[serde(default, rename = "userLongitude")]
    pub user_longitude: Option<f64>,
    /// Any JSON number; fractional ages are truncated to whole years
    #[serde(default, rename = "userAge")]
    pub user_age: Option<f64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default, rename = "pageSize", alias = "page_size")]
    pub page_size: Option<u32>,
}

impl RankEventsRequest {
    /// Build the caller context from the request fields
    pub fn caller_context(&self) -> Result<CallerContext, CallerError> {
        let user_id = self
            .user_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or(CallerError::Missing)?;
        let (Some(latitude), Some(longitude), Some(age)) =
            (self.user_latitude, self.user_longitude, self.user_age)
        else {
            return Err(CallerError::Missing);
        };

        if !age.is_finite() || !(0.0..=MAX_CALLER_AGE).contains(&age) {
            return Err(CallerError::InvalidAge(age));
        }

        Ok(CallerContext {
            user_id: user_id.to_string(),
            latitude,
            longitude,
            age: age.trunc() as i32,
        })
    }
}

/// Request to publish a new event
///
/// The age band is never accepted from the client; it is derived from the
/// group's average age when the event is created.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[serde(default)]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(min = 1))]
    pub organizer_id: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub post_only_to_group: bool,
}
