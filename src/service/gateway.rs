use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::booking::{CreatedEvent, EventDraft};
use crate::models::interval::BusyInterval;

/// Failure classes a calendar backend can report. Everything the remote
/// side does wrong lands in one of these; callers map them to user-facing
/// outcomes and never see transport errors directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    CredentialsMissing(String),
    PermissionDenied(String),
    CalendarNotFound(String),
    Upstream(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::CredentialsMissing(reason) => {
                write!(f, "credentials missing: {}", reason)
            }
            GatewayError::PermissionDenied(reason) => {
                write!(f, "permission denied: {}", reason)
            }
            GatewayError::CalendarNotFound(reason) => {
                write!(f, "calendar not found: {}", reason)
            }
            GatewayError::Upstream(reason) => write!(f, "upstream error: {}", reason),
        }
    }
}

impl std::error::Error for GatewayError {}

/// The external calendar service. Implementations are chosen once at
/// startup and injected; business logic only ever sees this trait.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Lists busy intervals between the two instants. A success may be empty.
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, GatewayError>;

    /// Inserts one event and returns its id and link.
    async fn insert_event(&self, draft: &EventDraft) -> Result<CreatedEvent, GatewayError>;
}

/// Deterministic stand-in for the live calendar: serves a fixed busy list
/// and fabricates event ids locally. Useful for demos and tests without
/// credentials.
pub struct OfflineGateway {
    busy: Vec<BusyInterval>,
}

impl OfflineGateway {
    pub fn new(busy: Vec<BusyInterval>) -> Self {
        Self { busy }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CalendarGateway for OfflineGateway {
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, GatewayError> {
        Ok(self
            .busy
            .iter()
            .filter(|iv| iv.overlaps_window(time_min, time_max))
            .cloned()
            .collect())
    }

    async fn insert_event(&self, draft: &EventDraft) -> Result<CreatedEvent, GatewayError> {
        let event_id = format!("offline-{}", Uuid::new_v4());
        println!(
            "[GATEWAY] offline event recorded: {} ({} - {})",
            draft.summary, draft.start, draft.end
        );
        Ok(CreatedEvent {
            html_link: format!("https://calendar.local/events/{}", event_id),
            event_id,
        })
    }
}
