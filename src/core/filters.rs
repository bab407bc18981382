use chrono::{DateTime, Utc};

use crate::models::{CallerContext, Event};

/// Why an event was left out of a caller's ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    GroupOnly,
    NotUpcoming,
    NoLocation,
    TooYoung,
    TooOld,
}

/// Check whether an event can be ranked for this caller
///
/// Group-only events never enter the global ranking; group-scoped listing
/// is a separate path.
#[inline]
pub fn is_eligible(event: &Event, caller: &CallerContext, now: DateTime<Utc>) -> bool {
    ineligibility_reason(event, caller, now).is_none()
}

/// First rule an event fails for this caller, if any
pub fn ineligibility_reason(
    event: &Event,
    caller: &CallerContext,
    now: DateTime<Utc>,
) -> Option<Ineligibility> {
    if event.post_only_to_group {
        return Some(Ineligibility::GroupOnly);
    }

    // Ongoing events count as past
    if event.start_time <= now {
        return Some(Ineligibility::NotUpcoming);
    }

    if event.coordinates().is_none() {
        return Some(Ineligibility::NoLocation);
    }

    matches_age_band(event, caller.age)
}

/// Check the event's inclusive age band; a missing bound is unbounded
#[inline]
fn matches_age_band(event: &Event, age: i32) -> Option<Ineligibility> {
    if event.min_age.is_some_and(|min| age < min) {
        return Some(Ineligibility::TooYoung);
    }
    if event.max_age.is_some_and(|max| age > max) {
        return Some(Ineligibility::TooOld);
    }
    None
}
