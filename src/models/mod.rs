// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{AgeBand, CallerContext, Event, EventPage, PagingPolicy, RankedEvent};
pub use requests::{CallerError, CreateEventRequest, RankEventsRequest, MAX_CALLER_AGE};
pub use responses::{ErrorResponse, HealthResponse, RankEventsResponse};
