// Core algorithm exports
pub mod age_band;
pub mod distance;
pub mod filters;
pub mod pager;
pub mod publisher;
pub mod ranker;

pub use age_band::{AgeBandError, AgeBandPolicy};
pub use distance::{haversine_distance, EARTH_RADIUS_MILES};
pub use filters::{ineligibility_reason, is_eligible, Ineligibility};
pub use pager::{EligibleEvents, PageAssembler, PageError, ScanLimits, ScanStop};
pub use publisher::{EventPublisher, PublishError};
pub use ranker::{RankingError, RankingService, MISSING_PARAMETERS};
