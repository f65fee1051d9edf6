use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::booking::{CreatedEvent, EventDraft};
use crate::models::interval::BusyInterval;
use crate::service::gateway::{CalendarGateway, GatewayError};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Everything the live gateway needs to talk to Google Calendar. All four
/// values must be present; partial configuration counts as missing.
#[derive(Debug, Clone)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub calendar_id: String,
}

impl GoogleCredentials {
    /// Reads GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET / GOOGLE_REFRESH_TOKEN /
    /// GOOGLE_CALENDAR_ID through the property getter. None if any is absent.
    pub fn from_props<F>(get_prop: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Some(Self {
            client_id: get_prop("GOOGLE_CLIENT_ID")?,
            client_secret: get_prop("GOOGLE_CLIENT_SECRET")?,
            refresh_token: get_prop("GOOGLE_REFRESH_TOKEN")?,
            calendar_id: get_prop("GOOGLE_CALENDAR_ID")?,
        })
    }
}

/// Live adapter for the Google Calendar v3 API. Exchanges the stored
/// refresh token for an access token per call; no token is cached, the
/// busy-interval cache upstream keeps call volume low anyway.
pub struct GoogleCalendarGateway {
    credentials: Option<GoogleCredentials>,
    http: reqwest::Client,
}

impl GoogleCalendarGateway {
    pub fn new(credentials: Option<GoogleCredentials>) -> Self {
        Self {
            credentials,
            http: reqwest::Client::new(),
        }
    }

    fn credentials(&self) -> Result<&GoogleCredentials, GatewayError> {
        self.credentials.as_ref().ok_or_else(|| {
            GatewayError::CredentialsMissing(
                "Google Calendar credentials not configured".to_string(),
            )
        })
    }

    async fn access_token(&self, creds: &GoogleCredentials) -> Result<String, GatewayError> {
        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", creds.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("token response unreadable: {}", e)))?;
        if !status.is_success() {
            // A rejected refresh token is a configuration problem, not a
            // transient remote failure.
            if status.as_u16() == 400 || status.as_u16() == 401 {
                return Err(GatewayError::CredentialsMissing(format!(
                    "refresh token rejected ({}): {}",
                    status, body
                )));
            }
            return Err(GatewayError::Upstream(format!(
                "token endpoint error ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Upstream(format!("token response malformed: {}", e)))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl CalendarGateway for GoogleCalendarGateway {
    async fn list_busy(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<BusyInterval>, GatewayError> {
        let creds = self.credentials()?;
        let token = self.access_token(creds).await?;

        let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE, creds.calendar_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("timeMax", time_max.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("events.list failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("events.list unreadable: {}", e)))?;
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), &body));
        }
        let events: EventsResponse = serde_json::from_str(&body)
            .map_err(|e| GatewayError::Upstream(format!("events.list malformed: {}", e)))?;

        println!("[CALENDAR] fetched {} events", events.items.len());
        Ok(busy_intervals_from_events(events.items))
    }

    async fn insert_event(&self, draft: &EventDraft) -> Result<CreatedEvent, GatewayError> {
        let creds = self.credentials()?;
        let token = self.access_token(creds).await?;

        let body = InsertEventBody::from_draft(draft);
        let url = format!("{}/calendars/{}/events", CALENDAR_API_BASE, creds.calendar_id);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Upstream(format!("events.insert failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Upstream(format!("events.insert unreadable: {}", e)))?;
        if !status.is_success() {
            return Err(map_api_error(status.as_u16(), &text));
        }
        let created: InsertEventResponse = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Upstream(format!("events.insert malformed: {}", e)))?;

        println!("[CALENDAR] event created: {}", created.id);
        Ok(CreatedEvent {
            event_id: created.id,
            html_link: created.html_link.unwrap_or_default(),
        })
    }
}

fn map_api_error(status: u16, body: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::PermissionDenied(format!(
            "calendar access rejected ({}): {}",
            status, body
        )),
        404 => GatewayError::CalendarNotFound(format!(
            "calendar id not accessible (404): {}",
            body
        )),
        _ => GatewayError::Upstream(format!("Google API error ({}): {}", status, body)),
    }
}

/// Timed events carry `dateTime`; all-day events only carry `date` and
/// block the whole day. Events with neither are skipped.
fn busy_intervals_from_events(items: Vec<GoogleEvent>) -> Vec<BusyInterval> {
    items
        .into_iter()
        .filter_map(|event| {
            let start = event_instant(&event.start)?;
            let end = event_instant(&event.end)?;
            if end > start {
                Some(BusyInterval::new(start, end))
            } else {
                None
            }
        })
        .collect()
}

fn event_instant(time: &GoogleEventTime) -> Option<DateTime<Utc>> {
    if let Some(date_time) = &time.date_time {
        return Some(date_time.with_timezone(&Utc));
    }
    let date = time.date?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleEvent {
    #[serde(default)]
    start: GoogleEventTime,
    #[serde(default)]
    end: GoogleEventTime,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: Option<DateTime<FixedOffset>>,
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct InsertEventBody {
    summary: String,
    description: String,
    start: EventDateTime,
    end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attendees: Vec<Attendee>,
    reminders: Reminders,
}

impl InsertEventBody {
    fn from_draft(draft: &EventDraft) -> Self {
        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            start: EventDateTime {
                date_time: draft.start.to_rfc3339(),
                time_zone: draft.timezone.name().to_string(),
            },
            end: EventDateTime {
                date_time: draft.end.to_rfc3339(),
                time_zone: draft.timezone.name().to_string(),
            },
            attendees: draft
                .attendee_email
                .iter()
                .map(|email| Attendee { email: email.clone() })
                .collect(),
            // Email an hour out, popup ten minutes out.
            reminders: Reminders {
                use_default: false,
                overrides: vec![
                    ReminderOverride { method: "email", minutes: 60 },
                    ReminderOverride { method: "popup", minutes: 10 },
                ],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct EventDateTime {
    #[serde(rename = "dateTime")]
    date_time: String,
    #[serde(rename = "timeZone")]
    time_zone: String,
}

#[derive(Debug, Serialize)]
struct Attendee {
    email: String,
}

#[derive(Debug, Serialize)]
struct Reminders {
    #[serde(rename = "useDefault")]
    use_default: bool,
    overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Serialize)]
struct ReminderOverride {
    method: &'static str,
    minutes: u32,
}

#[derive(Debug, Deserialize)]
struct InsertEventResponse {
    id: String,
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}
