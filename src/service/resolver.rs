//! Pure availability math. No I/O and no clock reads: everything is a
//! deterministic function of the busy intervals and the schedule, so two
//! calls with the same inputs always produce the same output.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::ScheduleConfig;
use crate::models::availability::{DayAvailability, DayStatus, SlotAvailability, SlotStatus};
use crate::models::interval::{BusyInterval, covers_window};

/// Month view: one entry per calendar day, ascending. Days off are
/// UNAVAILABLE outright; other days are FULLY_BOOKED only when the busy
/// intervals cover the whole business window, else AVAILABLE.
pub fn resolve_month(
    year: i32,
    month: u32,
    busy: &[BusyInterval],
    config: &ScheduleConfig,
) -> Vec<DayAvailability> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut days = Vec::with_capacity(31);
    let mut date = first;
    while date.year() == year && date.month() == month {
        days.push(DayAvailability {
            date,
            status: day_status(date, busy, config),
        });
        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }
    days
}

fn day_status(date: NaiveDate, busy: &[BusyInterval], config: &ScheduleConfig) -> DayStatus {
    if config.days_off.contains(&date.weekday()) {
        return DayStatus::Unavailable;
    }
    let window_start = zoned_instant(&config.timezone, date, config.business_start_hour * 60);
    let window_end = zoned_instant(&config.timezone, date, config.business_end_hour * 60);
    if covers_window(busy, window_start, window_end) {
        DayStatus::FullyBooked
    } else {
        DayStatus::Available
    }
}

/// Day view: one entry per slot from business start to end, ascending. A
/// slot is BUSY iff it overlaps at least one busy interval (half-open test
/// on absolute instants).
pub fn resolve_day_slots(
    date: NaiveDate,
    busy: &[BusyInterval],
    config: &ScheduleConfig,
) -> Vec<SlotAvailability> {
    let day_start = zoned_instant(&config.timezone, date, 0);
    let day_end = zoned_instant(&config.timezone, date, 24 * 60);
    // Defensive prefilter: only this day's intervals take part in the
    // per-slot overlap tests.
    let todays: Vec<&BusyInterval> = busy
        .iter()
        .filter(|iv| iv.overlaps_window(day_start, day_end))
        .collect();

    let window_start = zoned_instant(&config.timezone, date, config.business_start_hour * 60);
    let step = config.slot_duration_minutes;
    let mut slots = Vec::with_capacity(config.slots_per_day() as usize);
    for index in 0..config.slots_per_day() {
        let offset = index * step;
        let slot_start = window_start + Duration::minutes(offset as i64);
        let slot_end = slot_start + Duration::minutes(step as i64);
        let is_busy = todays
            .iter()
            .any(|iv| slot_start < iv.end && slot_end > iv.start);
        slots.push(SlotAvailability {
            start_hour: config.business_start_hour + offset / 60,
            status: if is_busy {
                SlotStatus::Busy
            } else {
                SlotStatus::Available
            },
        });
    }
    slots
}

/// Wall-clock minute-of-day on `date` in `tz`, as a UTC instant. Minutes
/// may run past midnight (e.g. 24 * 60 for the next day's start). On a DST
/// fold the earlier reading wins; inside a DST gap the naive reading is
/// taken as UTC, which keeps the function total.
fn zoned_instant(tz: &Tz, date: NaiveDate, minute_of_day: u32) -> DateTime<Utc> {
    let carry_days = minute_of_day / (24 * 60);
    let minute = minute_of_day % (24 * 60);
    let mut day = date;
    for _ in 0..carry_days {
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    let naive = day
        .and_hms_opt(minute / 60, minute % 60, 0)
        .expect("minute-of-day reduced below 24h");
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}
