use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use inquire::Text;

use crate::models::booking::{BookingOutcome, BookingRequest};
use crate::service::booking_service::BookingService;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print day availability for a month (defaults to the current one).
    Month {
        year: Option<i32>,
        month: Option<u32>,
    },
    /// Print the slot list for one day.
    Slots { date: NaiveDate },
    /// Create a booking; missing fields are prompted for.
    Book {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        briefing: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        date: Option<String>,
        /// HH:00
        #[arg(long)]
        start_time: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
    },
}

pub async fn cli(service: Arc<BookingService>) {
    // Fine to panic here
    let cli = Cli::parse();
    match cli.command {
        Commands::Month { year, month } => {
            let today = Utc::now().date_naive();
            let year = year.unwrap_or_else(|| today.year());
            let month = month.unwrap_or_else(|| today.month());
            let view = service.fetch_availability(year, month).await;
            if view.degraded {
                eprintln!("(calendar unreachable, showing open days)");
            }
            for day in view.days {
                println!("{}  {}", day.date, day.status.as_str());
            }
        }
        Commands::Slots { date } => {
            let view = service.fetch_slots(date).await;
            if view.degraded {
                eprintln!("(calendar unreachable, showing open slots)");
            }
            for slot in view.slots {
                println!("{}  {}", slot.label(), slot.status.as_str());
            }
        }
        Commands::Book {
            name,
            email,
            briefing,
            date,
            start_time,
            timezone,
        } => {
            let request = BookingRequest {
                name: prompt_if_missing(name, "Name:"),
                email: prompt_if_missing(email, "Email:"),
                briefing,
                date: prompt_if_missing(date, "Date (YYYY-MM-DD):"),
                start_time: prompt_if_missing(start_time, "Start time (HH:00):"),
                timezone,
            };
            match service.submit_booking(&request).await {
                BookingOutcome::Confirmed { event_id, link } => {
                    println!("Booked. Event {} ({})", event_id, link);
                }
                BookingOutcome::Offline { reason } => {
                    println!("Calendar offline: {}", reason);
                }
                BookingOutcome::PermissionDenied { reason } => {
                    println!("Permission denied: {}", reason);
                }
                BookingOutcome::ValidationError { reason } => {
                    println!("Invalid request: {}", reason);
                }
                BookingOutcome::Failed { reason } => {
                    println!("Booking failed: {}", reason);
                }
            }
        }
    }
}

fn prompt_if_missing(value: Option<String>, prompt: &str) -> String {
    match value {
        Some(v) => v,
        None => Text::new(prompt).prompt().expect("prompt failed"),
    }
}
