use actix_web::{web, HttpResponse, Responder};
use chrono_tz::Tz;
use std::sync::Arc;
use validator::Validate;

use crate::config::QueueSettings;
use crate::core::{AllocationError, SeatAllocator, StatusTracker};
use crate::models::{
    DistributeRequest, DistributeResponse, ErrorResponse, Event, HealthResponse,
    ReservationEventRequest, ReservationEventResponse, SweepRequest, SweepResponse,
};
use crate::services::{PgQueueStore, QueueStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub allocator: SeatAllocator<PgQueueStore, QueueSettings>,
    pub tracker: StatusTracker<PgQueueStore>,
    pub store: Arc<PgQueueStore>,
}

/// Configure all queue-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/queue/distribute", web::post().to(distribute_seats))
        .route("/queue/reservation/confirmed", web::post().to(reservation_confirmed))
        .route("/queue/reservation/expired", web::post().to(reservation_expired))
        .route("/queue/reservation/sweep", web::post().to(sweep_expired));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Run seat distribution for one event
///
/// POST /api/v1/queue/distribute
///
/// Request body:
/// ```json
/// {
///   "eventId": 1,
///   "eventName": "string",
///   "timezone": "Europe/Zurich"
/// }
/// ```
///
/// The returned matches are in FIFO subscriber order; the caller must create
/// reservations in that order under the pre-assigned reservation ids.
async fn distribute_seats(
    state: web::Data<AppState>,
    req: web::Json<DistributeRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let timezone = match req.timezone.parse::<Tz>() {
        Ok(tz) => tz,
        Err(_) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid timezone".to_string(),
                message: format!("{} is not a known IANA timezone", req.timezone),
                status_code: 400,
            });
        }
    };

    let event = Event {
        id: req.event_id,
        short_name: req.event_name.clone(),
        timezone,
    };

    match state.allocator.distribute_seats(&event).await {
        Ok(matches) => {
            tracing::info!(
                "distributed {} seats for event {}",
                matches.len(),
                event.short_name
            );
            HttpResponse::Ok().json(DistributeResponse {
                event_id: event.id,
                count: matches.len(),
                matches: matches.into_iter().map(Into::into).collect(),
            })
        }
        Err(e) if e.is_transient() => {
            tracing::warn!("seat distribution for event {} hit contention: {}", event.id, e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Storage contention".to_string(),
                message: "Concurrent distribution in progress, retry later".to_string(),
                status_code: 503,
            })
        }
        Err(e @ AllocationError::NoUnboundedCategory(_)) => {
            tracing::error!("event {} is misconfigured: {}", event.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Category misconfiguration".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
        Err(e) => {
            tracing::error!("seat distribution failed for event {}: {}", event.id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Distribution failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// A matched reservation's purchase completed
///
/// POST /api/v1/queue/reservation/confirmed
async fn reservation_confirmed(
    state: web::Data<AppState>,
    req: web::Json<ReservationEventRequest>,
) -> impl Responder {
    match state.tracker.mark_acquired(req.reservation_id).await {
        Ok(updated) => HttpResponse::Ok().json(ReservationEventResponse {
            success: true,
            updated,
        }),
        Err(e) => {
            tracing::error!("failed to mark reservation {} acquired: {}", req.reservation_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Status update failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// A matched reservation timed out without completing
///
/// POST /api/v1/queue/reservation/expired
async fn reservation_expired(
    state: web::Data<AppState>,
    req: web::Json<ReservationEventRequest>,
) -> impl Responder {
    match state.tracker.mark_expired(req.reservation_id).await {
        Ok(updated) => HttpResponse::Ok().json(ReservationEventResponse {
            success: true,
            updated,
        }),
        Err(e) => {
            tracing::error!("failed to mark reservation {} expired: {}", req.reservation_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Status update failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Periodic sweep over timed-out reservations
///
/// POST /api/v1/queue/reservation/sweep
async fn sweep_expired(
    state: web::Data<AppState>,
    req: web::Json<SweepRequest>,
) -> impl Responder {
    match state.tracker.bulk_expire(&req.reservation_ids).await {
        Ok(expired) => HttpResponse::Ok().json(SweepResponse { expired }),
        Err(e) => {
            tracing::error!("reservation sweep failed: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Sweep failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
