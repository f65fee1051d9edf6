use std::convert::Infallible;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use warp::Filter;
use warp::http::StatusCode;

use crate::models::booking::{BookingOutcome, BookingRequest};
use crate::models::interval::BusyInterval;
use crate::service::booking_service::{BookingService, DEFAULT_WINDOW_DAYS};
use crate::service::gateway::GatewayError;

/// The two booking routes plus CORS, ready for `warp::serve`.
pub fn routes(
    service: Arc<BookingService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_header("content-type");

    availability_route(service.clone())
        .or(bookings_route(service))
        .with(cors)
}

fn availability_route(
    service: Arc<BookingService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("availability")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<AvailabilityQuery>())
        .and(with_service(service))
        .and_then(handle_availability)
}

fn bookings_route(
    service: Arc<BookingService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    warp::path("bookings")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json())
        .and(with_service(service))
        .and_then(handle_booking)
}

fn with_service(
    service: Arc<BookingService>,
) -> impl Filter<Extract = (Arc<BookingService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

#[derive(Debug, Deserialize)]
struct AvailabilityQuery {
    window: Option<i64>,
}

#[derive(Debug, Serialize)]
struct BusySlotBody {
    start: String,
    end: String,
}

impl From<&BusyInterval> for BusySlotBody {
    fn from(interval: &BusyInterval) -> Self {
        Self {
            start: interval.start.to_rfc3339(),
            end: interval.end.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse {
    status: &'static str,
    #[serde(rename = "busySlots")]
    busy_slots: Vec<BusySlotBody>,
    #[serde(rename = "syncTime", skip_serializing_if = "Option::is_none")]
    sync_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn handle_availability(
    query: AvailabilityQuery,
    service: Arc<BookingService>,
) -> Result<impl warp::Reply, Infallible> {
    let window = query.window.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, 90);
    let (code, body) = match service.list_busy_window(window).await {
        Ok(busy) => (
            StatusCode::OK,
            AvailabilityResponse {
                status: "SUCCESS",
                busy_slots: busy.iter().map(BusySlotBody::from).collect(),
                sync_time: Some(Utc::now().to_rfc3339()),
                error: None,
            },
        ),
        Err(GatewayError::CredentialsMissing(reason)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            AvailabilityResponse {
                status: "OFFLINE",
                busy_slots: Vec::new(),
                sync_time: None,
                error: Some(reason),
            },
        ),
        Err(err) => {
            eprintln!("[HTTP] availability fetch failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                AvailabilityResponse {
                    status: "ERROR",
                    busy_slots: Vec::new(),
                    sync_time: None,
                    error: Some(err.to_string()),
                },
            )
        }
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}

#[derive(Debug, Serialize)]
struct BookingResponse {
    status: &'static str,
    #[serde(rename = "eventId", skip_serializing_if = "Option::is_none")]
    event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn handle_booking(
    request: BookingRequest,
    service: Arc<BookingService>,
) -> Result<impl warp::Reply, Infallible> {
    let outcome = service.submit_booking(&request).await;
    let status = outcome.status_str();
    let (code, body) = match outcome {
        BookingOutcome::Confirmed { event_id, link } => (
            StatusCode::OK,
            BookingResponse {
                status,
                event_id: Some(event_id),
                link: Some(link),
                error: None,
            },
        ),
        BookingOutcome::ValidationError { reason } => {
            (StatusCode::BAD_REQUEST, error_body(status, reason))
        }
        BookingOutcome::PermissionDenied { reason } => {
            (StatusCode::FORBIDDEN, error_body(status, reason))
        }
        BookingOutcome::Offline { reason } => {
            (StatusCode::SERVICE_UNAVAILABLE, error_body(status, reason))
        }
        BookingOutcome::Failed { reason } => {
            eprintln!("[HTTP] booking failed: {}", reason);
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(status, reason))
        }
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), code))
}

fn error_body(status: &'static str, reason: String) -> BookingResponse {
    BookingResponse {
        status,
        event_id: None,
        link: None,
        error: Some(reason),
    }
}
