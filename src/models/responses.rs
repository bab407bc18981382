use serde::{Deserialize, Serialize};
use crate::models::domain::{EventPage, RankedEvent};

/// Response for the ranked events endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankEventsResponse {
    pub events: Vec<RankedEvent>,
    pub has_more: bool,
    pub next_offset: Option<u64>,
}

impl From<EventPage> for RankEventsResponse {
    fn from(page: EventPage) -> Self {
        Self {
            events: page.events,
            has_more: page.has_more,
            next_offset: page.next_offset,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
