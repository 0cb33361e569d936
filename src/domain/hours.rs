// src/domain/hours.rs

use crate::domain::laundromat::Hours;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// A single day's schedule parsed from the free-text hours column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySchedule {
    Closed,
    AllDay,
    /// Minutes since midnight. `close <= open` means the range runs past midnight.
    Range { open: u32, close: u32 },
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parses "7:00 AM - 10:00 PM", "7am-10pm", "Open 24 hours" or "Closed".
pub fn parse_day(text: &str) -> Option<DaySchedule> {
    let t = text.trim().to_lowercase();
    if t.is_empty() {
        return None;
    }
    if t == "closed" {
        return Some(DaySchedule::Closed);
    }
    if t.contains("24 hours") || t == "24/7" || t == "open 24h" {
        return Some(DaySchedule::AllDay);
    }

    let normalized = t.replace(['–', '—'], "-").replace(" to ", "-");
    let (open, close) = normalized.split_once('-')?;
    let open = parse_clock(open)?;
    let close = parse_clock(close)?;
    if open == close {
        return Some(DaySchedule::AllDay);
    }
    Some(DaySchedule::Range { open, close })
}

/// "7", "7am", "7:30 PM", "12:00 am", "noon", "midnight" -> minutes since midnight.
fn parse_clock(raw: &str) -> Option<u32> {
    let s = raw.trim().replace('.', "");
    match s.as_str() {
        "noon" => return Some(12 * 60),
        "midnight" => return Some(0),
        _ => {}
    }

    let (digits, meridiem) = if let Some(rest) = s.strip_suffix("am") {
        (rest.trim(), Some(false))
    } else if let Some(rest) = s.strip_suffix("pm") {
        (rest.trim(), Some(true))
    } else {
        (s.as_str(), None)
    };

    let (h, m) = match digits.split_once(':') {
        Some((h, m)) => (h.trim().parse::<u32>().ok()?, m.trim().parse::<u32>().ok()?),
        None => (digits.parse::<u32>().ok()?, 0),
    };
    if m >= 60 {
        return None;
    }

    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&h) {
                return None;
            }
            match (h, pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            }
        }
        None if h <= 24 => h % 24,
        None => return None,
    };

    Some(hour * 60 + m)
}

/// Raw text stored for `day`, accepting "Monday" or "Mon" keys in any case.
pub fn hours_text(hours: &Hours, day: Weekday) -> Option<&str> {
    let name = weekday_name(day);
    hours
        .iter()
        .find(|(k, _)| {
            let k = k.trim();
            k.eq_ignore_ascii_case(name) || k.eq_ignore_ascii_case(&name[..3])
        })
        .map(|(_, v)| v.as_str())
}

fn schedule_for(hours: &Hours, day: Weekday) -> Option<DaySchedule> {
    hours_text(hours, day).and_then(parse_day)
}

/// Whether the listing is open at `at` (local wall-clock time of the listing).
///
/// Returns `None` when the hours for the relevant day are missing or unparseable.
pub fn is_open_at(hours: &Hours, at: NaiveDateTime) -> Option<bool> {
    let minute = at.hour() * 60 + at.minute();
    let today = schedule_for(hours, at.weekday())?;

    let open_today = match today {
        DaySchedule::Closed => false,
        DaySchedule::AllDay => true,
        DaySchedule::Range { open, close } if close > open => minute >= open && minute < close,
        DaySchedule::Range { open, .. } => minute >= open,
    };
    if open_today {
        return Some(true);
    }

    // Yesterday's overnight range may still be running.
    let yesterday = (at - Duration::days(1)).weekday();
    if let Some(DaySchedule::Range { open, close }) = schedule_for(hours, yesterday) {
        if close <= open && minute < close {
            return Some(true);
        }
    }

    Some(false)
}

pub fn format_minutes(minutes: u32) -> String {
    let t = NaiveTime::from_hms_opt(minutes / 60 % 24, minutes % 60, 0).unwrap_or(NaiveTime::MIN);
    t.format("%-I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn hours(pairs: &[(&str, &str)]) -> Hours {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // 2024-01-01 was a Monday.
    fn monday_at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn parses_common_formats() {
        assert_eq!(
            parse_day("7:00 AM - 10:00 PM"),
            Some(DaySchedule::Range { open: 420, close: 1320 })
        );
        assert_eq!(
            parse_day("6am-11pm"),
            Some(DaySchedule::Range { open: 360, close: 1380 })
        );
        assert_eq!(parse_day("Open 24 hours"), Some(DaySchedule::AllDay));
        assert_eq!(parse_day("Closed"), Some(DaySchedule::Closed));
        assert_eq!(
            parse_day("12:00 PM – 12:00 AM"),
            Some(DaySchedule::Range { open: 720, close: 0 })
        );
        assert_eq!(parse_day("call for hours"), None);
        assert_eq!(parse_day(""), None);
    }

    #[test]
    fn open_and_closed_within_a_day() {
        let h = hours(&[("Monday", "7:00 AM - 10:00 PM")]);
        assert_eq!(is_open_at(&h, monday_at(6, 59)), Some(false));
        assert_eq!(is_open_at(&h, monday_at(7, 0)), Some(true));
        assert_eq!(is_open_at(&h, monday_at(21, 59)), Some(true));
        assert_eq!(is_open_at(&h, monday_at(22, 0)), Some(false));
    }

    #[test]
    fn overnight_range_spills_into_next_day() {
        let h = hours(&[("Sunday", "6 AM - 2 AM"), ("Monday", "Closed")]);
        assert_eq!(is_open_at(&h, monday_at(1, 30)), Some(true));
        assert_eq!(is_open_at(&h, monday_at(2, 30)), Some(false));
    }

    #[test]
    fn unknown_hours_are_not_reported_open() {
        let h = hours(&[("Tuesday", "8am-8pm")]);
        assert_eq!(is_open_at(&h, monday_at(12, 0)), None);
        let garbled = hours(&[("Monday", "ask the attendant")]);
        assert_eq!(is_open_at(&garbled, monday_at(12, 0)), None);
    }

    #[test]
    fn abbreviated_day_keys_match() {
        let h = hours(&[("mon", "24 hours")]);
        assert_eq!(is_open_at(&h, monday_at(3, 0)), Some(true));
    }

    #[test]
    fn formats_minutes_as_clock() {
        assert_eq!(format_minutes(420), "7:00 AM");
        assert_eq!(format_minutes(1320), "10:00 PM");
    }
}
