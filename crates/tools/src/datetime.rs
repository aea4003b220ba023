//! Date and time tools. All parsing and arithmetic happens in UTC.

use crate::{envelope, fields, Args, ToolError, ToolResult};
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::fmt::{Display, Write};

const DEFAULT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
// Keeps chrono::Duration constructors clear of their overflow panics.
const MAX_OFFSET_DAYS: i64 = 1_000_000;

fn format_with<Tz: TimeZone>(dt: &DateTime<Tz>, format: &str) -> Result<String, ToolError>
where
    Tz::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).map_err(|_| ToolError::InvalidField {
        field: "format",
        expected: "must be a valid strftime format",
    })?;
    Ok(out)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`.
fn parse_datetime(field: &'static str, input: &str) -> Result<DateTime<Utc>, ToolError> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or(ToolError::InvalidField {
            field,
            expected: "must be a date (YYYY-MM-DD) or RFC 3339 timestamp",
        })
}

/// Current time, local by default or UTC with `"utc": true`.
pub fn current_time(args: &Value) -> Value {
    envelope(current_time_impl(args))
}

fn current_time_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let format = args.opt_str("format")?.unwrap_or(DEFAULT_FORMAT);
    let utc = args.opt_bool("utc")?.unwrap_or(false);

    let now = Utc::now();
    let (formatted, iso, timezone) = if utc {
        (format_with(&now, format)?, now.to_rfc3339(), "UTC".to_string())
    } else {
        let local = now.with_timezone(&Local);
        (
            format_with(&local, format)?,
            local.to_rfc3339(),
            local.offset().to_string(),
        )
    };

    Ok(fields(json!({
        "formatted": formatted,
        "iso": iso,
        "timezone": timezone,
        "unix_timestamp": now.timestamp(),
    })))
}

/// Render a unix timestamp (seconds) in UTC.
pub fn format_timestamp(args: &Value) -> Value {
    envelope(format_timestamp_impl(args))
}

fn format_timestamp_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let timestamp = args.i64("timestamp")?;
    let format = args.opt_str("format")?.unwrap_or(DEFAULT_FORMAT);

    let dt = DateTime::from_timestamp(timestamp, 0).ok_or(ToolError::InvalidField {
        field: "timestamp",
        expected: "is out of range",
    })?;

    Ok(fields(json!({
        "formatted": format_with(&dt, format)?,
        "iso": dt.to_rfc3339(),
    })))
}

/// Shift a date by a signed number of days, hours and minutes.
pub fn date_add(args: &Value) -> Value {
    envelope(date_add_impl(args))
}

fn date_add_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let start = parse_datetime("date", args.str("date")?)?;
    let days = args.opt_i64("days")?.unwrap_or(0);
    let hours = args.opt_i64("hours")?.unwrap_or(0);
    let minutes = args.opt_i64("minutes")?.unwrap_or(0);

    let within = |v: i64, per_day: i64| v.checked_abs().is_some_and(|a| a / per_day <= MAX_OFFSET_DAYS);
    if !(within(days, 1) && within(hours, 24) && within(minutes, 24 * 60)) {
        return Err(ToolError::Failed("offset is too large".to_string()));
    }

    let offset = Duration::days(days) + Duration::hours(hours) + Duration::minutes(minutes);
    let result = start
        .checked_add_signed(offset)
        .ok_or_else(|| ToolError::Failed("resulting date is out of range".to_string()))?;

    Ok(fields(json!({
        "result": result.to_rfc3339(),
        "date": result.format("%Y-%m-%d").to_string(),
        "day_of_week": result.format("%A").to_string(),
    })))
}

/// Signed distance from `start` to `end`.
pub fn date_diff(args: &Value) -> Value {
    envelope(date_diff_impl(args))
}

fn date_diff_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let start = parse_datetime("start", args.str("start")?)?;
    let end = parse_datetime("end", args.str("end")?)?;

    let delta = end.signed_duration_since(start);
    Ok(fields(json!({
        "days": delta.num_days(),
        "hours": delta.num_hours(),
        "minutes": delta.num_minutes(),
        "seconds": delta.num_seconds(),
    })))
}

/// Weekday name and ISO number (Monday = 1) for a date.
pub fn day_of_week(args: &Value) -> Value {
    envelope(day_of_week_impl(args))
}

fn day_of_week_impl(args: &Value) -> ToolResult {
    let args = Args::new(args)?;
    let date = parse_datetime("date", args.str("date")?)?;

    Ok(fields(json!({
        "day_of_week": date.format("%A").to_string(),
        "iso_weekday": date.weekday().number_from_monday(),
        "day_of_year": date.ordinal(),
    })))
}
