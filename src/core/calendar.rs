//! Academic session labels and display date/time strings.
//!
//! Payments carry their date and time as two separate display strings
//! (`"Apr 1, 2023"`, `"9:05 AM"`). Sorting by date needs them back as a timestamp,
//! so the parser here accepts the written format plus the loose variants found in
//! older records (`"Apr 1,2023"`, `"09:00AM"`).

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Academic session label for the session starting in `year`, e.g. `"2024/2025"`.
#[must_use]
pub fn academic_session(year: i32) -> String {
    format!("{}/{}", year, year + 1)
}

/// Formats a date as a short US display string, e.g. `"Apr 1, 2023"`.
#[must_use]
pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Formats a time as a 12-hour display string, e.g. `"9:05 AM"`.
#[must_use]
pub fn format_display_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// The session, date and time strings stamped onto records created at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayStamp {
    /// Academic session label
    pub session: String,
    /// Date display string
    pub date: String,
    /// Time display string
    pub time: String,
}

impl DisplayStamp {
    /// Stamp for a given local date and time.
    #[must_use]
    pub fn at(moment: NaiveDateTime) -> Self {
        Self {
            session: academic_session(moment.year()),
            date: format_display_date(moment.date()),
            time: format_display_time(moment.time()),
        }
    }

    /// Stamp for the current local time.
    #[must_use]
    pub fn now() -> Self {
        Self::at(Local::now().naive_local())
    }
}

/// Combines a display date and display time back into a timestamp.
///
/// A blank time means midnight. Returns `None` if either part cannot be read.
#[must_use]
pub fn parse_display_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = parse_display_date(date)?;
    let time = parse_display_time(time)?;
    Some(date.and_time(time))
}

fn parse_display_date(date: &str) -> Option<NaiveDate> {
    // "Apr  1 , 2023" -> "Apr 1,2023"
    let normalized = date
        .split(',')
        .map(|part| part.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join(",");

    NaiveDate::parse_from_str(&normalized, "%b %d,%Y")
        .or_else(|_| NaiveDate::parse_from_str(&normalized, "%B %d,%Y"))
        .ok()
}

fn parse_display_time(time: &str) -> Option<NaiveTime> {
    let compact: String = time
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    if compact.is_empty() {
        return Some(NaiveTime::MIN);
    }

    NaiveTime::parse_from_str(&compact, "%I:%M%p")
        .or_else(|_| NaiveTime::parse_from_str(&compact, "%H:%M"))
        .ok()
}
