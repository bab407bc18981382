use actix_web::{http::StatusCode, web, HttpResponse, Responder, ResponseError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::core::{EventPublisher, PublishError, RankingError, RankingService};
use crate::models::{CreateEventRequest, ErrorResponse, HealthResponse, RankEventsRequest, RankEventsResponse};
use crate::services::EventStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub ranking: RankingService,
    pub publisher: EventPublisher,
    pub store: Arc<dyn EventStore>,
    /// Cancelled on shutdown; each request scans under a child token
    pub shutdown: CancellationToken,
}

/// Configure all event routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/events/ranked", web::post().to(rank_events))
        .route("/events", web::post().to(create_event));
}

impl ResponseError for RankingError {
    fn status_code(&self) -> StatusCode {
        match self {
            RankingError::Validation(_) => StatusCode::BAD_REQUEST,
            RankingError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RankingError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

impl ResponseError for PublishError {
    fn status_code(&self) -> StatusCode {
        match self {
            PublishError::Validation(_) => StatusCode::BAD_REQUEST,
            PublishError::InvalidInput(_) | PublishError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Ranked events endpoint
///
/// POST /api/v1/events/ranked
///
/// Request body:
/// ```json
/// {
///   "user_id": "string",
///   "userLatitude": 40.7,
///   "userLongitude": -74.0,
///   "userAge": 27,
///   "offset": 0,
///   "pageSize": 25
/// }
/// ```
///
/// Events come back in discovery order with a `distance` field in miles;
/// clients wanting nearest-first must sort themselves.
async fn rank_events(
    state: web::Data<AppState>,
    req: web::Json<RankEventsRequest>,
) -> Result<HttpResponse, RankingError> {
    let cancel = state.shutdown.child_token();

    match state.ranking.rank(&req, &cancel).await {
        Ok(page) => Ok(HttpResponse::Ok().json(RankEventsResponse::from(page))),
        Err(e) => {
            match &e {
                RankingError::Validation(_) => {
                    tracing::info!("Rejected ranking request: {}", e);
                }
                _ => tracing::error!("Failed to rank events for {:?}: {}", req.user_id, e),
            }
            Err(e)
        }
    }
}

/// Create event endpoint
///
/// POST /api/v1/events
///
/// The age band is derived server-side; any `min_age`/`max_age` in the body
/// is ignored.
async fn create_event(
    state: web::Data<AppState>,
    req: web::Json<CreateEventRequest>,
) -> Result<HttpResponse, PublishError> {
    let event = state.publisher.publish(&req).await.map_err(|e| {
        tracing::warn!("Failed to publish event for {}: {}", req.organizer_id, e);
        e
    })?;

    Ok(HttpResponse::Created().json(event))
}
