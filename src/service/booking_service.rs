use std::sync::Arc;
use std::time::Instant;

use chrono::{Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;

use crate::config::ScheduleConfig;
use crate::models::availability::{DayAvailability, SlotAvailability, normalize_hour};
use crate::models::booking::{BookingOutcome, BookingRequest, EventDraft};
use crate::models::interval::BusyInterval;
use crate::service::gateway::{CalendarGateway, GatewayError};
use crate::service::resolver;

/// Raw busy lists are reused for this long before asking the gateway again.
const BUSY_CACHE_TTL_SECS: u64 = 60;

/// How far forward a busy fetch reaches by default, matching the calendar
/// widget's horizon.
pub const DEFAULT_WINDOW_DAYS: i64 = 60;

pub struct MonthAvailability {
    pub days: Vec<DayAvailability>,
    /// Set when the gateway read failed and the calendar degraded to
    /// fail-open (nothing known busy). The view renders, with a warning.
    pub degraded: bool,
}

pub struct DaySlots {
    pub slots: Vec<SlotAvailability>,
    pub degraded: bool,
}

struct CachedBusy {
    fetched_at: Instant,
    window_days: i64,
    intervals: Vec<BusyInterval>,
}

/// Sequences gateway reads, the pure resolver, and gateway writes. Holds
/// nothing beyond the schedule and a short-lived busy cache; the cache is
/// per-process state, never shared across users.
pub struct BookingService {
    gateway: Arc<dyn CalendarGateway>,
    schedule: ScheduleConfig,
    cache: Mutex<Option<CachedBusy>>,
}

impl BookingService {
    pub fn new(gateway: Arc<dyn CalendarGateway>, schedule: ScheduleConfig) -> Self {
        Self {
            gateway,
            schedule,
            cache: Mutex::new(None),
        }
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }

    /// The raw busy list over `window_days` from now, served from cache when
    /// a recent fetch already covers the window.
    pub async fn list_busy_window(
        &self,
        window_days: i64,
    ) -> Result<Vec<BusyInterval>, GatewayError> {
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if cached.fetched_at.elapsed().as_secs() < BUSY_CACHE_TTL_SECS
                && cached.window_days >= window_days
            {
                return Ok(cached.intervals.clone());
            }
        }
        let now = Utc::now();
        let intervals = self
            .gateway
            .list_busy(now, now + Duration::days(window_days))
            .await?;
        *cache = Some(CachedBusy {
            fetched_at: Instant::now(),
            window_days,
            intervals: intervals.clone(),
        });
        Ok(intervals)
    }

    /// Month view. Gateway read failures degrade to an open calendar with
    /// the degraded flag set; the caller decides how loudly to warn.
    pub async fn fetch_availability(&self, year: i32, month: u32) -> MonthAvailability {
        match self.list_busy_window(DEFAULT_WINDOW_DAYS).await {
            Ok(busy) => MonthAvailability {
                days: resolver::resolve_month(year, month, &busy, &self.schedule),
                degraded: false,
            },
            Err(err) => {
                eprintln!("[BOOKING] busy fetch failed, showing open calendar: {}", err);
                MonthAvailability {
                    days: resolver::resolve_month(year, month, &[], &self.schedule),
                    degraded: true,
                }
            }
        }
    }

    /// Slot view for one day, same cache and fail-open policy.
    pub async fn fetch_slots(&self, date: NaiveDate) -> DaySlots {
        match self.list_busy_window(DEFAULT_WINDOW_DAYS).await {
            Ok(busy) => DaySlots {
                slots: resolver::resolve_day_slots(date, &busy, &self.schedule),
                degraded: false,
            },
            Err(err) => {
                eprintln!("[BOOKING] busy fetch failed, showing open slots: {}", err);
                DaySlots {
                    slots: resolver::resolve_day_slots(date, &[], &self.schedule),
                    degraded: true,
                }
            }
        }
    }

    /// Validates locally, then hands the normalized event to the gateway.
    /// Invalid input never reaches the network. Gateway failures map onto
    /// the outcome taxonomy; nothing is retried here.
    pub async fn submit_booking(&self, request: &BookingRequest) -> BookingOutcome {
        let draft = match build_event_draft(request, &self.schedule) {
            Ok(draft) => draft,
            Err(reason) => {
                eprintln!("[BOOKING] rejected before submit: {}", reason);
                return BookingOutcome::ValidationError { reason };
            }
        };
        println!(
            "[BOOKING] submitting \"{}\" {} - {}",
            draft.summary, draft.start, draft.end
        );
        match self.gateway.insert_event(&draft).await {
            Ok(created) => BookingOutcome::Confirmed {
                event_id: created.event_id,
                link: created.html_link,
            },
            Err(GatewayError::CredentialsMissing(reason)) => BookingOutcome::Offline { reason },
            Err(GatewayError::PermissionDenied(reason)) => {
                BookingOutcome::PermissionDenied { reason }
            }
            Err(GatewayError::CalendarNotFound(reason)) => BookingOutcome::Failed { reason },
            Err(GatewayError::Upstream(reason)) => BookingOutcome::Failed { reason },
        }
    }
}

fn build_event_draft(
    request: &BookingRequest,
    schedule: &ScheduleConfig,
) -> Result<EventDraft, String> {
    if request.name.trim().is_empty() {
        return Err("name is required".to_string());
    }
    if request.email.trim().is_empty() {
        return Err("email is required".to_string());
    }
    if request.date.trim().is_empty() {
        return Err("date is required".to_string());
    }
    if request.start_time.trim().is_empty() {
        return Err("startTime is required".to_string());
    }

    let date = NaiveDate::parse_from_str(request.date.trim(), "%Y-%m-%d")
        .map_err(|_| format!("date does not parse as YYYY-MM-DD: {:?}", request.date))?;
    let normalized = normalize_hour(&request.start_time);
    let time = NaiveTime::parse_from_str(&normalized, "%H:%M")
        .map_err(|_| format!("startTime does not parse as an hour: {:?}", request.start_time))?;

    let timezone: Tz = match request.timezone.as_deref() {
        Some(zone) if !zone.trim().is_empty() => zone
            .trim()
            .parse()
            .map_err(|_| format!("unknown timezone: {:?}", zone))?,
        _ => schedule.timezone,
    };

    let start = match timezone.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => {
            return Err(format!(
                "start {} {} does not exist in {}",
                request.date, normalized, timezone
            ));
        }
    };
    let end = start + Duration::minutes(schedule.slot_duration_minutes as i64);

    let briefing = request
        .briefing
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .unwrap_or("No briefing provided.");

    Ok(EventDraft {
        summary: format!("Alignment: {}", request.name.trim()),
        description: format!(
            "Briefing: {}\n\nContact: {}\nRequested: {} at {}",
            briefing,
            request.email.trim(),
            request.date.trim(),
            normalized
        ),
        start,
        end,
        timezone,
        attendee_email: Some(request.email.trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc_schedule() -> ScheduleConfig {
        ScheduleConfig {
            timezone: chrono_tz::UTC,
            ..ScheduleConfig::default()
        }
    }

    fn valid_request() -> BookingRequest {
        BookingRequest {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            briefing: Some("Systems role".to_string()),
            date: "2026-01-12".to_string(),
            start_time: "14:00".to_string(),
            timezone: None,
        }
    }

    #[test]
    fn draft_spans_one_slot_duration() {
        let draft = build_event_draft(&valid_request(), &utc_schedule()).unwrap();
        assert_eq!(draft.end - draft.start, Duration::minutes(60));
        assert_eq!(draft.start.to_rfc3339(), "2026-01-12T14:00:00+00:00");
        assert_eq!(draft.summary, "Alignment: Ada");
        assert!(draft.description.contains("ada@example.com"));
    }

    #[test]
    fn bare_hour_start_time_is_normalized() {
        let request = BookingRequest {
            start_time: "9".to_string(),
            ..valid_request()
        };
        let draft = build_event_draft(&request, &utc_schedule()).unwrap();
        assert_eq!(draft.start.to_rfc3339(), "2026-01-12T09:00:00+00:00");
    }

    #[test]
    fn explicit_timezone_shifts_the_instant() {
        let request = BookingRequest {
            timezone: Some("Europe/Rome".to_string()),
            ..valid_request()
        };
        let draft = build_event_draft(&request, &utc_schedule()).unwrap();
        // Rome is UTC+1 in January.
        assert_eq!(draft.start.to_rfc3339(), "2026-01-12T13:00:00+00:00");
    }

    #[test]
    fn unknown_timezone_is_a_validation_failure() {
        let request = BookingRequest {
            timezone: Some("Mars/Olympus_Mons".to_string()),
            ..valid_request()
        };
        let err = build_event_draft(&request, &utc_schedule()).unwrap_err();
        assert!(err.contains("unknown timezone"));
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let request = BookingRequest {
            email: "   ".to_string(),
            ..valid_request()
        };
        let err = build_event_draft(&request, &utc_schedule()).unwrap_err();
        assert!(err.contains("email"));
    }

    #[test]
    fn empty_briefing_gets_the_placeholder() {
        let request = BookingRequest {
            briefing: None,
            ..valid_request()
        };
        let draft = build_event_draft(&request, &utc_schedule()).unwrap();
        assert!(draft.description.contains("No briefing provided."));
    }
}
