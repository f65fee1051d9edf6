use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayStatus {
    Available,
    Unavailable,
    FullyBooked,
}

impl DayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayStatus::Available => "AVAILABLE",
            DayStatus::Unavailable => "UNAVAILABLE",
            DayStatus::FullyBooked => "FULLY_BOOKED",
        }
    }
}

/// One calendar day in the month view. Derived on every render, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub status: DayStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    Available,
    Busy,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "AVAILABLE",
            SlotStatus::Busy => "BUSY",
        }
    }
}

/// One bookable unit within business hours on a selected day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAvailability {
    pub start_hour: u32,
    pub status: SlotStatus,
}

impl SlotAvailability {
    /// The "HH:00" label shown next to the slot.
    pub fn label(&self) -> String {
        format!("{:02}:00", self.start_hour)
    }
}

/// Normalizes a user-supplied hour string to "HH:MM" with zero padding.
/// "9:00" -> "09:00", "14:00" -> "14:00", a bare "9" -> "09:00".
pub fn normalize_hour(raw: &str) -> String {
    let raw = raw.trim();
    match raw.split_once(':') {
        Some((hours, minutes)) => format!("{:0>2}:{:0>2}", hours.trim(), minutes.trim()),
        None => format!("{:0>2}:00", raw),
    }
}
