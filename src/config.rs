use std::collections::HashMap;
use std::fs;

use chrono::Weekday;
use chrono_tz::Tz;

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(format!("Invalid config line {}: {}", idx + 1, line));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if (value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\''))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Business-hours settings for the booking calendar. Built once at startup
/// and shared read-only from then on.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub business_start_hour: u32,
    pub business_end_hour: u32,
    pub slot_duration_minutes: u32,
    pub days_off: Vec<Weekday>,
    pub timezone: Tz,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            business_start_hour: 10,
            business_end_hour: 18,
            slot_duration_minutes: 60,
            days_off: vec![Weekday::Sun, Weekday::Sat],
            timezone: chrono_tz::Europe::Rome,
        }
    }
}

impl ScheduleConfig {
    /// Reads schedule settings through a property getter (config file with
    /// env fallback). Missing keys keep their defaults; present keys must
    /// parse and the resulting schedule must be coherent.
    pub fn from_props<F>(get_prop: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut schedule = Self::default();
        if let Some(raw) = get_prop("BUSINESS_START_HOUR") {
            schedule.business_start_hour = parse_hour("BUSINESS_START_HOUR", &raw)?;
        }
        if let Some(raw) = get_prop("BUSINESS_END_HOUR") {
            schedule.business_end_hour = parse_hour("BUSINESS_END_HOUR", &raw)?;
        }
        if let Some(raw) = get_prop("SLOT_DURATION_MINUTES") {
            schedule.slot_duration_minutes = raw
                .parse()
                .map_err(|_| format!("SLOT_DURATION_MINUTES is not a number: {}", raw))?;
        }
        if let Some(raw) = get_prop("DAYS_OFF") {
            schedule.days_off = parse_days_off(&raw)?;
        }
        if let Some(raw) = get_prop("SCHEDULE_TIMEZONE") {
            schedule.timezone = raw
                .parse()
                .map_err(|_| format!("SCHEDULE_TIMEZONE is not an IANA zone: {}", raw))?;
        }
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), String> {
        if self.business_start_hour >= self.business_end_hour {
            return Err(format!(
                "business hours empty: start {} >= end {}",
                self.business_start_hour, self.business_end_hour
            ));
        }
        if self.business_end_hour > 24 {
            return Err(format!(
                "BUSINESS_END_HOUR out of range: {}",
                self.business_end_hour
            ));
        }
        if self.slot_duration_minutes == 0 {
            return Err("SLOT_DURATION_MINUTES must be positive".to_string());
        }
        if self.window_minutes() % self.slot_duration_minutes != 0 {
            return Err(format!(
                "slot duration {}m does not divide the {}m business window",
                self.slot_duration_minutes,
                self.window_minutes()
            ));
        }
        Ok(())
    }

    pub fn window_minutes(&self) -> u32 {
        (self.business_end_hour - self.business_start_hour) * 60
    }

    pub fn slots_per_day(&self) -> u32 {
        self.window_minutes() / self.slot_duration_minutes
    }
}

fn parse_hour(key: &str, raw: &str) -> Result<u32, String> {
    let hour: u32 = raw
        .parse()
        .map_err(|_| format!("{} is not a number: {}", key, raw))?;
    if hour > 24 {
        return Err(format!("{} out of range: {}", key, raw));
    }
    Ok(hour)
}

// Weekday indices as the calendar UI uses them: 0 = Sunday .. 6 = Saturday.
fn parse_days_off(raw: &str) -> Result<Vec<Weekday>, String> {
    let mut days = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let day = match part {
            "0" => Weekday::Sun,
            "1" => Weekday::Mon,
            "2" => Weekday::Tue,
            "3" => Weekday::Wed,
            "4" => Weekday::Thu,
            "5" => Weekday::Fri,
            "6" => Weekday::Sat,
            other => return Err(format!("DAYS_OFF entry is not a weekday index: {}", other)),
        };
        if !days.contains(&day) {
            days.push(day);
        }
    }
    Ok(days)
}
