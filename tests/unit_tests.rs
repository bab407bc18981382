// Unit tests for Lume Discover

use lume_discover::core::{
    age_band::{AgeBandError, AgeBandPolicy},
    distance::haversine_distance,
    filters::{ineligibility_reason, is_eligible, Ineligibility},
};
use lume_discover::models::{AgeBand, CallerContext, Event};
use chrono::{Duration, Utc};
use uuid::Uuid;

fn create_event(min_age: Option<i32>, max_age: Option<i32>, post_only_to_group: bool) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: "Rooftop yoga".to_string(),
        description: Some("Bring a mat".to_string()),
        start_time: now + Duration::hours(6),
        end_time: now + Duration::hours(8),
        latitude: Some(40.7484),
        longitude: Some(-73.9857),
        organizer_id: "organizer".to_string(),
        group_id: None,
        post_only_to_group,
        min_age,
        max_age,
        created_at: now,
    }
}

fn create_caller(age: i32) -> CallerContext {
    CallerContext {
        user_id: "caller".to_string(),
        latitude: 40.7128,
        longitude: -74.0060,
        age,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(40.7128, -74.0060, 40.7128, -74.0060);
    assert!(distance.abs() < 1e-9);
}

#[test]
fn test_haversine_distance_symmetric() {
    let points = [
        (40.7128, -74.0060),
        (34.0522, -118.2437),
        (-33.8688, 151.2093),
        (89.9, 0.0),
        (0.0, -179.9),
    ];

    for &(lat1, lon1) in &points {
        for &(lat2, lon2) in &points {
            let there = haversine_distance(lat1, lon1, lat2, lon2);
            let back = haversine_distance(lat2, lon2, lat1, lon1);
            assert!((there - back).abs() < 1e-6, "Asymmetric: {} vs {}", there, back);
            assert!(there >= 0.0);
        }
    }
}

#[test]
fn test_haversine_equator_degree() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
    assert!((distance - 69.17).abs() < 0.1, "Expected ~69mi, got {}", distance);
}

#[test]
fn test_haversine_nyc_to_la() {
    // Roughly 2445 miles
    let distance = haversine_distance(40.7128, -74.0060, 34.0522, -118.2437);
    assert!((distance - 2445.0).abs() < 20.0, "Expected ~2445mi, got {}", distance);
}

#[test]
fn test_haversine_near_pole() {
    // Two points near the pole on opposite meridians are close together
    let distance = haversine_distance(89.9, 0.0, 89.9, 180.0);
    assert!(distance < 14.0, "Expected ~13.8mi, got {}", distance);
}

#[test]
fn test_age_band_thirty() {
    let policy = AgeBandPolicy::default();
    assert!((policy.spread(30.0) - 13.6).abs() < 0.05);
    assert_eq!(policy.derive(30.0), Ok(AgeBand { min_age: 16, max_age: 44 }));
}

#[test]
fn test_age_band_one() {
    assert_eq!(
        AgeBandPolicy::default().derive(1.0),
        Ok(AgeBand { min_age: 13, max_age: 13 })
    );
}

#[test]
fn test_age_band_rejects_zero_and_negative() {
    let policy = AgeBandPolicy::default();
    assert_eq!(policy.derive(0.0), Err(AgeBandError::InvalidInput(0.0)));
    assert_eq!(policy.derive(-12.0), Err(AgeBandError::InvalidInput(-12.0)));
}

#[test]
fn test_age_band_always_ordered() {
    let policy = AgeBandPolicy::default();
    for tenths in 1..2000 {
        let average = f64::from(tenths) / 10.0;
        let band = policy.derive(average).unwrap();
        assert!(band.min_age <= band.max_age, "Inverted band for {}: {:?}", average, band);
        assert!(band.min_age >= 13 && band.max_age <= 100);
    }
}

#[test]
fn test_group_only_event_never_eligible() {
    let event = create_event(None, None, true);
    for age in [13, 25, 60, 100] {
        assert!(!is_eligible(&event, &create_caller(age), Utc::now()));
    }
}

#[test]
fn test_age_band_eligibility() {
    let event = create_event(Some(18), Some(25), false);
    let now = Utc::now();

    assert!(!is_eligible(&event, &create_caller(30), now));
    assert!(is_eligible(&event, &create_caller(20), now));
}

#[test]
fn test_past_event_filtered() {
    let event = create_event(None, None, false);
    let later = event.start_time + Duration::minutes(1);

    assert_eq!(
        ineligibility_reason(&event, &create_caller(25), later),
        Some(Ineligibility::NotUpcoming)
    );
}

#[test]
fn test_unlocated_event_filtered() {
    let mut event = create_event(None, None, false);
    event.latitude = None;
    event.longitude = None;

    assert_eq!(
        ineligibility_reason(&event, &create_caller(25), Utc::now()),
        Some(Ineligibility::NoLocation)
    );
}
