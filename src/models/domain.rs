use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event as persisted in the event store
///
/// `min_age`/`max_age` are the inclusive age band attached at creation time.
/// Either side may be `None`, meaning unbounded on that side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub organizer_id: String,
    #[serde(default)]
    pub group_id: Option<Uuid>,
    #[serde(default)]
    pub post_only_to_group: bool,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Both coordinates, if the event has a location at all
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }

    /// Attach a derived age band
    pub fn with_age_band(mut self, band: AgeBand) -> Self {
        self.min_age = Some(band.min_age);
        self.max_age = Some(band.max_age);
        self
    }
}

/// Inclusive age range derived from a group's average age
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBand {
    pub min_age: i32,
    pub max_age: i32,
}

/// Who is asking, and from where. Supplied per request, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerContext {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub age: i32,
}

/// An eligible event annotated with its distance from the caller, in miles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEvent {
    #[serde(flatten)]
    pub event: Event,
    pub distance: f64,
}

/// One page of ranked events plus the continuation cursor
#[derive(Debug, Clone, PartialEq)]
pub struct EventPage {
    pub events: Vec<RankedEvent>,
    pub has_more: bool,
    pub next_offset: Option<u64>,
}

/// Paging tunables, hoisted out of the assembler loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagingPolicy {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub overfetch_multiplier: u32,
    pub max_round_trips: u32,
    pub scan_budget: Option<std::time::Duration>,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            default_page_size: 25,
            max_page_size: 100,
            overfetch_multiplier: 2,
            max_round_trips: 10,
            scan_budget: None,
        }
    }
}
