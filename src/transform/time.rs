use crate::config;
use crate::error::{AppError, AppResult};
use crate::model::common::EpochMillis;
use crate::model::star::TimeRow;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

fn weekday_name(day: Weekday) -> &'static str {
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

fn to_datetime(epoch_millis: EpochMillis) -> AppResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_millis).ok_or_else(|| {
        AppError::transform(format!("timestamp {} is out of range", epoch_millis))
    })
}

/// Formats an epoch in milliseconds as the `start_time` text key (UTC).
pub fn format_start_time(epoch_millis: EpochMillis) -> AppResult<String> {
    to_datetime(epoch_millis).map(|dt| dt.format(config::TIMESTAMP_FORMAT).to_string())
}

/// Calendar fields of one event timestamp, in UTC.
///
/// `week` is the ISO-8601 week number, so the first days of January may
/// belong to week 52 or 53 of the previous year. `weekday` is the English
/// day name.
pub fn derive_time(epoch_millis: EpochMillis) -> AppResult<TimeRow> {
    let dt = to_datetime(epoch_millis)?;

    Ok(TimeRow {
        start_time: dt.format(config::TIMESTAMP_FORMAT).to_string(),
        hour: dt.hour(),
        day: dt.day(),
        week: dt.iso_week().week(),
        month: dt.month(),
        year: dt.year(),
        weekday: weekday_name(dt.weekday()).to_string(),
    })
}
