use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// A booking submission as it arrives from the contact form or CLI.
/// All fields default so that sparse payloads reach validation instead of
/// failing deserialization; validation produces the user-facing message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub briefing: Option<String>,
    /// "YYYY-MM-DD"
    #[serde(default)]
    pub date: String,
    /// "HH:00", also accepted as "H:00" or a bare hour.
    #[serde(default, rename = "startTime")]
    pub start_time: String,
    /// IANA zone name; falls back to the schedule's zone when absent.
    #[serde(default)]
    pub timezone: Option<String>,
}

/// The normalized event handed to the calendar gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub summary: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub timezone: Tz,
    pub attendee_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub event_id: String,
    pub html_link: String,
}

/// Terminal result of a booking attempt. One of these always reaches the
/// caller; transport errors never escape raw. A failed booking is only
/// retried by explicit user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Confirmed { event_id: String, link: String },
    Offline { reason: String },
    PermissionDenied { reason: String },
    ValidationError { reason: String },
    Failed { reason: String },
}

impl BookingOutcome {
    pub fn status_str(&self) -> &'static str {
        match self {
            BookingOutcome::Confirmed { .. } => "CONFIRMED",
            BookingOutcome::Offline { .. } => "OFFLINE",
            BookingOutcome::PermissionDenied { .. } => "PERMISSION_DENIED",
            BookingOutcome::ValidationError { .. } => "VALIDATION_ERROR",
            BookingOutcome::Failed { .. } => "FAILED",
        }
    }
}
