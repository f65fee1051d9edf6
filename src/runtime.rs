use std::sync::Arc;

use crate::clients::google_calendar::{GoogleCalendarGateway, GoogleCredentials};
use crate::handlers::http;
use crate::service::booking_service::BookingService;
use crate::service::gateway::{CalendarGateway, OfflineGateway};

/// Picks the calendar backend once at startup. `CALENDAR_MODE=offline`
/// forces the simulator; otherwise the live Google adapter runs with
/// whatever credentials are configured (it reports CredentialsMissing per
/// call when they are absent, which the HTTP layer turns into 503s).
pub fn build_gateway<F>(get_prop: F) -> Arc<dyn CalendarGateway>
where
    F: Fn(&str) -> Option<String>,
{
    if get_prop("CALENDAR_MODE").as_deref() == Some("offline") {
        println!("[RUNTIME] calendar mode: offline simulator");
        return Arc::new(OfflineGateway::empty());
    }
    let credentials = GoogleCredentials::from_props(&get_prop);
    if credentials.is_none() {
        eprintln!("[RUNTIME] Google credentials incomplete; calendar calls will report offline");
    }
    Arc::new(GoogleCalendarGateway::new(credentials))
}

pub async fn run_api(service: Arc<BookingService>, port: u16) {
    let routes = http::routes(service);
    println!("[RUNTIME] booking api listening on 0.0.0.0:{}", port);
    warp::serve(routes).run(([0, 0, 0, 0], port)).await;
}
