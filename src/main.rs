use std::env;
use std::sync::Arc;

use slotbook::cli;
use slotbook::config::{AppConfig, ScheduleConfig};
use slotbook::runtime;
use slotbook::service::booking_service::BookingService;

const DEFAULT_RUN_MODE: &str = "cli";
const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() {
    let config = match env::var("CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    };

    let get_prop = |key: &str| -> Option<String> {
        config.get(key).or_else(|| env::var(key).ok())
    };

    let schedule = ScheduleConfig::from_props(&get_prop).expect("Invalid schedule configuration");
    let gateway = runtime::build_gateway(&get_prop);
    let service = Arc::new(BookingService::new(gateway, schedule));

    let run_mode = get_prop("RUN_MODE").unwrap_or(DEFAULT_RUN_MODE.to_string());
    if run_mode == "api" {
        let port = get_prop("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        runtime::run_api(service, port).await;
    } else if run_mode == "cli" {
        cli::cli(service).await;
    } else {
        println!("Invalid run mode {}", run_mode);
    }
}
