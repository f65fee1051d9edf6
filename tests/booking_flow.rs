use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use chrono::{DateTime, Duration, TimeZone, Utc, Weekday};
use slotbook::config::ScheduleConfig;
use slotbook::models::availability::DayStatus;
use slotbook::models::booking::{BookingOutcome, BookingRequest, CreatedEvent, EventDraft};
use slotbook::models::interval::BusyInterval;
use slotbook::service::booking_service::BookingService;
use slotbook::service::gateway::{CalendarGateway, GatewayError};

struct ScriptedGateway {
    busy: Vec<BusyInterval>,
    list_error: Option<GatewayError>,
    insert_result: Result<CreatedEvent, GatewayError>,
    list_calls: StdMutex<u32>,
    insert_calls: StdMutex<u32>,
    last_draft: StdMutex<Option<EventDraft>>,
}

impl ScriptedGateway {
    fn new() -> Self {
        Self {
            busy: Vec::new(),
            list_error: None,
            insert_result: Ok(CreatedEvent {
                event_id: "evt-1".to_string(),
                html_link: "https://calendar.example/evt-1".to_string(),
            }),
            list_calls: StdMutex::new(0),
            insert_calls: StdMutex::new(0),
            last_draft: StdMutex::new(None),
        }
    }

    fn list_calls(&self) -> u32 {
        *self.list_calls.lock().unwrap()
    }

    fn insert_calls(&self) -> u32 {
        *self.insert_calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl CalendarGateway for ScriptedGateway {
    async fn list_busy(
        &self,
        _time_min: DateTime<Utc>,
        _time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, GatewayError> {
        *self.list_calls.lock().unwrap() += 1;
        match &self.list_error {
            Some(err) => Err(err.clone()),
            None => Ok(self.busy.clone()),
        }
    }

    async fn insert_event(&self, draft: &EventDraft) -> Result<CreatedEvent, GatewayError> {
        *self.insert_calls.lock().unwrap() += 1;
        *self.last_draft.lock().unwrap() = Some(draft.clone());
        self.insert_result.clone()
    }
}

fn utc_schedule() -> ScheduleConfig {
    ScheduleConfig {
        business_start_hour: 10,
        business_end_hour: 18,
        slot_duration_minutes: 60,
        days_off: vec![Weekday::Sun, Weekday::Sat],
        timezone: chrono_tz::UTC,
    }
}

fn service_with(gateway: Arc<ScriptedGateway>) -> BookingService {
    BookingService::new(gateway, utc_schedule())
}

fn valid_request() -> BookingRequest {
    BookingRequest {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        briefing: Some("Intro call".to_string()),
        date: "2026-01-12".to_string(),
        start_time: "14:00".to_string(),
        timezone: Some("UTC".to_string()),
    }
}

// Invalid input is rejected locally; the gateway is never consulted.
#[tokio::test]
async fn missing_email_short_circuits_before_the_gateway() {
    let gateway = Arc::new(ScriptedGateway::new());
    let service = service_with(gateway.clone());

    let request = BookingRequest {
        email: "".to_string(),
        ..valid_request()
    };
    let outcome = service.submit_booking(&request).await;

    assert!(matches!(outcome, BookingOutcome::ValidationError { .. }));
    assert_eq!(gateway.insert_calls(), 0);
    assert_eq!(gateway.list_calls(), 0);
}

#[tokio::test]
async fn permission_denied_surfaces_as_an_outcome_not_a_panic() {
    let mut gateway = ScriptedGateway::new();
    gateway.insert_result = Err(GatewayError::PermissionDenied(
        "write scope missing".to_string(),
    ));
    let service = service_with(Arc::new(gateway));

    let outcome = service.submit_booking(&valid_request()).await;
    match outcome {
        BookingOutcome::PermissionDenied { reason } => {
            assert!(reason.contains("write scope"));
        }
        other => panic!("expected permission denied, got {:?}", other),
    }
}

#[tokio::test]
async fn missing_credentials_map_to_offline() {
    let mut gateway = ScriptedGateway::new();
    gateway.insert_result = Err(GatewayError::CredentialsMissing("no token".to_string()));
    let service = service_with(Arc::new(gateway));

    let outcome = service.submit_booking(&valid_request()).await;
    assert!(matches!(outcome, BookingOutcome::Offline { .. }));
}

#[tokio::test]
async fn upstream_errors_map_to_failed() {
    let mut gateway = ScriptedGateway::new();
    gateway.insert_result = Err(GatewayError::Upstream("502 from Google".to_string()));
    let service = service_with(Arc::new(gateway));

    let outcome = service.submit_booking(&valid_request()).await;
    assert!(matches!(outcome, BookingOutcome::Failed { .. }));
}

#[tokio::test]
async fn confirmed_booking_carries_the_event_id_and_one_slot_span() {
    let gateway = Arc::new(ScriptedGateway::new());
    let service = service_with(gateway.clone());

    let outcome = service.submit_booking(&valid_request()).await;
    match outcome {
        BookingOutcome::Confirmed { event_id, link } => {
            assert_eq!(event_id, "evt-1");
            assert!(link.contains("evt-1"));
        }
        other => panic!("expected confirmation, got {:?}", other),
    }

    let draft = gateway.last_draft.lock().unwrap().clone().unwrap();
    assert_eq!(draft.end - draft.start, Duration::minutes(60));
    assert_eq!(
        draft.start,
        Utc.with_ymd_and_hms(2026, 1, 12, 14, 0, 0).unwrap()
    );
    assert!(draft.summary.contains("Ada"));
}

// Read failures degrade to an open calendar instead of an error.
#[tokio::test]
async fn busy_fetch_failure_fails_open_with_a_degraded_flag() {
    let mut gateway = ScriptedGateway::new();
    gateway.list_error = Some(GatewayError::Upstream("timeout".to_string()));
    let service = service_with(Arc::new(gateway));

    let view = service.fetch_availability(2026, 1).await;
    assert!(view.degraded);
    assert_eq!(view.days.len(), 31);
    // Structural day-off rules still apply without busy data.
    assert_eq!(view.days[10].status, DayStatus::Unavailable);
    assert_eq!(view.days[11].status, DayStatus::Available);

    let slots = service
        .fetch_slots(chrono::NaiveDate::from_ymd_opt(2026, 1, 12).unwrap())
        .await;
    assert!(slots.degraded);
    assert_eq!(slots.slots.len(), 8);
}

#[tokio::test]
async fn busy_list_is_cached_across_views() {
    let gateway = Arc::new(ScriptedGateway::new());
    let service = service_with(gateway.clone());

    service.fetch_availability(2026, 1).await;
    service.fetch_availability(2026, 2).await;
    service
        .fetch_slots(chrono::NaiveDate::from_ymd_opt(2026, 1, 12).unwrap())
        .await;

    assert_eq!(gateway.list_calls(), 1);
}

#[tokio::test]
async fn unknown_timezone_is_rejected_locally() {
    let gateway = Arc::new(ScriptedGateway::new());
    let service = service_with(gateway.clone());

    let request = BookingRequest {
        timezone: Some("Atlantis/Central".to_string()),
        ..valid_request()
    };
    let outcome = service.submit_booking(&request).await;

    assert!(matches!(outcome, BookingOutcome::ValidationError { .. }));
    assert_eq!(gateway.insert_calls(), 0);
}
