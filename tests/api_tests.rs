// HTTP tests for Lume Discover routes

use actix_web::{test, web, App};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lume_discover::core::{AgeBandPolicy, EventPublisher, RankingService};
use lume_discover::models::{Event, PagingPolicy};
use lume_discover::routes::{configure_routes, handle_json_payload_error, AppState};
use lume_discover::services::{AverageAgeCache, EventStore, InMemoryEventStore, StoreError};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

fn create_event(index: i64, post_only_to_group: bool) -> Event {
    let now = Utc::now();
    Event {
        id: Uuid::new_v4(),
        title: format!("Event {}", index),
        description: None,
        start_time: now + Duration::days(1),
        end_time: now + Duration::days(1) + Duration::hours(1),
        latitude: Some(0.0),
        longitude: Some(1.0),
        organizer_id: "organizer".to_string(),
        group_id: None,
        post_only_to_group,
        min_age: None,
        max_age: None,
        created_at: now + Duration::seconds(index),
    }
}

fn create_state(store: Arc<dyn EventStore>) -> AppState {
    AppState {
        ranking: RankingService::new(store.clone(), PagingPolicy::default()),
        publisher: EventPublisher::new(
            store.clone(),
            AverageAgeCache::new(100, 60),
            AgeBandPolicy::default(),
            25.0,
        ),
        store,
        shutdown: CancellationToken::new(),
    }
}

struct DownStore;

#[async_trait]
impl EventStore for DownStore {
    async fn fetch_upcoming(&self, _: DateTime<Utc>, _: u64, _: u32) -> Result<Vec<Event>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn insert_event(&self, _: &Event) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn group_average_age(&self, _: Uuid) -> Result<Option<f64>, StoreError> {
        Ok(None)
    }
    async fn health_check(&self) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_ranked_events_response_shape() {
    let store = Arc::new(InMemoryEventStore::with_events(vec![
        create_event(0, false),
        create_event(1, true),
        create_event(2, false),
    ]));
    let app = init_app!(create_state(store));

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({
            "user_id": "u1",
            "userLatitude": 0.0,
            "userLongitude": 0.0,
            "userAge": 22
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["title"], "Event 0");
    assert!((events[0]["distance"].as_f64().unwrap() - 69.09).abs() < 0.01);
    assert_eq!(body["has_more"], false);
    assert!(body["next_offset"].is_null());
}

#[actix_web::test]
async fn test_missing_parameters_rejected() {
    let store = Arc::new(InMemoryEventStore::with_events(vec![create_event(0, false)]));
    let app = init_app!(create_state(store.clone()));

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({ "user_id": "u1", "userLatitude": 0.0, "userAge": 22 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Missing required parameters" }));
    assert_eq!(store.fetch_count(), 0);
}

#[actix_web::test]
async fn test_fractional_age_accepted_negative_age_rejected() {
    let store = Arc::new(InMemoryEventStore::with_events(vec![create_event(0, false)]));
    let app = init_app!(create_state(store));

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({
            "user_id": "u1",
            "userLatitude": 0.0,
            "userLongitude": 0.0,
            "userAge": 30.0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({
            "user_id": "u1",
            "userLatitude": 0.0,
            "userLongitude": 0.0,
            "userAge": -4
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid userAge: -4" }));
}

#[actix_web::test]
async fn test_malformed_json_rejected() {
    let app = init_app!(create_state(Arc::new(InMemoryEventStore::new())));

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"user_id\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[actix_web::test]
async fn test_store_failure_is_500() {
    let app = init_app!(create_state(Arc::new(DownStore)));

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({
            "user_id": "u1",
            "userLatitude": 0.0,
            "userLongitude": 0.0,
            "userAge": 22
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
    assert!(body.get("events").is_none());
}

#[actix_web::test]
async fn test_shutdown_cancels_scans() {
    let state = create_state(Arc::new(InMemoryEventStore::with_events(vec![create_event(0, false)])));
    state.shutdown.cancel();
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/events/ranked")
        .set_json(json!({
            "user_id": "u1",
            "userLatitude": 0.0,
            "userLongitude": 0.0,
            "userAge": 22
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 503);
}

#[actix_web::test]
async fn test_create_event_derives_band() {
    let store = Arc::new(InMemoryEventStore::new());
    let app = init_app!(create_state(store.clone()));
    let start = Utc::now() + Duration::days(2);

    let req = test::TestRequest::post()
        .uri("/api/v1/events")
        .set_json(json!({
            "title": "Climbing meetup",
            "start_time": start,
            "end_time": start + Duration::hours(2),
            "latitude": 40.7,
            "longitude": -74.0,
            "organizer_id": "organizer",
            "min_age": 50,
            "max_age": 60
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    let expected = AgeBandPolicy::default().derive(25.0).unwrap();
    assert_eq!(body["min_age"], expected.min_age);
    assert_eq!(body["max_age"], expected.max_age);
    assert_eq!(store.len().await, 1);
}

#[actix_web::test]
async fn test_create_event_rejects_inverted_times() {
    let app = init_app!(create_state(Arc::new(InMemoryEventStore::new())));
    let start = Utc::now() + Duration::days(2);

    let req = test::TestRequest::post()
        .uri("/api/v1/events")
        .set_json(json!({
            "title": "Backwards",
            "start_time": start,
            "end_time": start - Duration::hours(1),
            "organizer_id": "organizer"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_web::test]
async fn test_health_reports_degraded_store() {
    let app = init_app!(create_state(Arc::new(DownStore)));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "degraded");
}
