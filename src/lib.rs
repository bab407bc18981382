//! Lume Discover - event discovery service for the Lume app
//!
//! This library provides the ranking-and-pagination engine behind the
//! "events near me" feed. It filters upcoming events by visibility and age
//! band, annotates them with their distance from the caller, and fills
//! stable pages by over-fetching from a live event store.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{haversine_distance, AgeBandPolicy, EventPublisher, PageAssembler, RankingService};
pub use models::{AgeBand, CallerContext, Event, EventPage, PagingPolicy, RankEventsRequest, RankEventsResponse, RankedEvent};
pub use services::{EventStore, InMemoryEventStore, StoreError};
