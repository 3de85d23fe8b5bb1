//! CF time-unit decoding checks
//!
//! A variable whose `units` attribute reads `<unit> since <reference>` is
//! time-like. Decoding it requires a known unit, a parseable reference
//! date-time, and a supported `calendar`.

use super::AttrValue;
use crate::error::{NcompareError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

const TIME_UNITS: &[&str] = &[
    "weeks", "week", "days", "day", "d", "hours", "hour", "hrs", "hr", "h", "minutes", "minute",
    "mins", "min", "seconds", "second", "secs", "sec", "s", "milliseconds", "millisecond", "ms",
    "microseconds", "microsecond", "us",
];

const CALENDARS: &[&str] = &[
    "standard",
    "gregorian",
    "proleptic_gregorian",
    "noleap",
    "365_day",
    "all_leap",
    "366_day",
    "360_day",
    "julian",
    "none",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Validate the time encoding of one variable, if it has one.
pub fn check_time_units(variable: &str, attributes: &IndexMap<String, AttrValue>) -> Result<()> {
    let Some(units) = attributes.get("units").and_then(AttrValue::as_text) else {
        return Ok(());
    };
    let Some((unit, reference)) = units.split_once(" since ") else {
        return Ok(());
    };

    let unit = unit.trim().to_ascii_lowercase();
    if !TIME_UNITS.contains(&unit.as_str()) {
        return Err(NcompareError::time_decoding(format!(
            "variable <{variable}> has unknown time unit '{unit}' in units '{units}'"
        )));
    }

    if parse_reference(reference.trim()).is_none() {
        return Err(NcompareError::time_decoding(format!(
            "variable <{variable}> has unparseable reference date '{}'",
            reference.trim()
        )));
    }

    if let Some(calendar) = attributes.get("calendar").and_then(AttrValue::as_text) {
        let calendar = calendar.trim().to_ascii_lowercase();
        if !CALENDARS.contains(&calendar.as_str()) {
            return Err(NcompareError::time_decoding(format!(
                "variable <{variable}> uses unsupported calendar '{calendar}'"
            )));
        }
    }

    Ok(())
}

fn parse_reference(reference: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(reference) {
        return Some(dt.naive_utc());
    }

    let stripped = reference
        .trim_end_matches(" UTC")
        .trim_end_matches(" utc")
        .trim_end_matches('Z');

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(stripped, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(stripped, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
