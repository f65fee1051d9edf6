use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time range the calendar backend reports as occupied. Half-open:
/// the instant at `end` is already free again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Half-open overlap test on absolute instants.
    pub fn overlaps(&self, other: &BusyInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn overlaps_window(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        self.start < window_end && self.end > window_start
    }
}

/// True iff the union of `intervals` covers all of `[window_start, window_end)`.
/// Sweeps a coverage frontier over the intervals sorted by start; any gap
/// before the frontier reaches the window end means uncovered time.
pub fn covers_window(
    intervals: &[BusyInterval],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> bool {
    if window_start >= window_end {
        return true;
    }
    let mut relevant: Vec<&BusyInterval> = intervals
        .iter()
        .filter(|iv| iv.overlaps_window(window_start, window_end))
        .collect();
    relevant.sort_by_key(|iv| iv.start);

    let mut frontier = window_start;
    for interval in relevant {
        if interval.start > frontier {
            return false;
        }
        if interval.end > frontier {
            frontier = interval.end;
        }
        if frontier >= window_end {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interval(start_hour: u32, end_hour: u32) -> BusyInterval {
        BusyInterval::new(
            Utc.with_ymd_and_hms(2026, 1, 12, start_hour, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 1, 12, end_hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn adjacent_intervals_do_not_overlap() {
        let a = interval(9, 10);
        let b = interval(10, 11);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn an_interval_overlaps_itself() {
        let a = interval(9, 10);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn partial_overlap_is_detected_both_ways() {
        let a = interval(9, 11);
        let b = interval(10, 12);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn coverage_requires_no_gaps() {
        let window_start = Utc.with_ymd_and_hms(2026, 1, 12, 10, 0, 0).unwrap();
        let window_end = Utc.with_ymd_and_hms(2026, 1, 12, 18, 0, 0).unwrap();

        // Touching pieces cover the window.
        let full = vec![interval(9, 13), interval(13, 16), interval(16, 19)];
        assert!(covers_window(&full, window_start, window_end));

        // A one-hour hole at 13:00 does not.
        let gapped = vec![interval(9, 13), interval(14, 19)];
        assert!(!covers_window(&gapped, window_start, window_end));
    }

    #[test]
    fn unsorted_and_nested_intervals_still_cover() {
        let window_start = Utc.with_ymd_and_hms(2026, 1, 12, 10, 0, 0).unwrap();
        let window_end = Utc.with_ymd_and_hms(2026, 1, 12, 14, 0, 0).unwrap();
        let messy = vec![interval(12, 14), interval(10, 13), interval(11, 12)];
        assert!(covers_window(&messy, window_start, window_end));
    }

    #[test]
    fn empty_interval_list_covers_nothing() {
        let window_start = Utc.with_ymd_and_hms(2026, 1, 12, 10, 0, 0).unwrap();
        let window_end = Utc.with_ymd_and_hms(2026, 1, 12, 11, 0, 0).unwrap();
        assert!(!covers_window(&[], window_start, window_end));
    }
}
