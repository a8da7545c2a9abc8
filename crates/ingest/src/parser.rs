use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use pruner_core::{HttpMethod, NewUsageEvent, format_ts};
use serde_json::{Map, Value};

use crate::types::ValidationError;

const EMPTY_PAYLOAD: &str = "Payload must be an object or non-empty array";

/// Stored timestamps compare as strings, which only holds for four-digit years.
const MAX_YEAR: i32 = 9999;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"];

/// Local times without an offset are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Validates a tracking body (one object or an array of objects). The first
/// invalid item rejects the whole batch.
pub fn parse_tracking_payload(
    payload: &Value,
    now: DateTime<Utc>,
) -> Result<Vec<NewUsageEvent>, ValidationError> {
    let items: Vec<&Value> = match payload {
        Value::Array(items) if !items.is_empty() => items.iter().collect(),
        Value::Object(_) => vec![payload],
        _ => return Err(ValidationError::payload(EMPTY_PAYLOAD)),
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| parse_event(index, item, now))
        .collect()
}

pub fn parse_event(
    index: usize,
    item: &Value,
    now: DateTime<Utc>,
) -> Result<NewUsageEvent, ValidationError> {
    let Some(object) = item.as_object() else {
        return Err(ValidationError::item(index, None, "must be an object"));
    };

    let method = required_string(index, object, "method")?;
    let route = required_string(index, object, "route")?;
    let status_code = required_status_code(index, object)?;

    let method = HttpMethod::parse(method).ok_or_else(|| {
        ValidationError::item(
            index,
            Some("method"),
            format!("Invalid HTTP method '{}'", method),
        )
    })?;

    let ts = match present(object, "timestamp") {
        Some(value) => parse_ts(value).ok_or_else(|| {
            ValidationError::item(
                index,
                Some("timestamp"),
                "Invalid 'timestamp' format (must be ISO 8601)",
            )
        })?,
        None => now,
    };

    // Unlike the other optional fields, an explicit null latency is invalid.
    let latency_ms = match object.get("latency").or_else(|| object.get("latencyMs")) {
        Some(value) => {
            let latency = value.as_f64().ok_or_else(|| {
                ValidationError::item(index, Some("latency"), "'latency' must be a number")
            })?;
            if latency < 0.0 {
                return Err(ValidationError::item(
                    index,
                    Some("latency"),
                    "'latency' must be non-negative",
                ));
            }
            latency
        }
        None => 0.0,
    };

    Ok(NewUsageEvent {
        method,
        route: route.to_string(),
        status_code,
        ts: format_ts(ts),
        latency_ms,
    })
}

/// Accepts ISO 8601 date-times (with or without offset, seconds or
/// fraction), bare `YYYY-MM-DD` dates and epoch milliseconds. Years outside
/// 0000-9999 are rejected.
pub fn parse_ts(value: &Value) -> Option<DateTime<Utc>> {
    let parsed = match value {
        Value::String(raw) => parse_ts_str(raw.trim())?,
        Value::Number(number) => {
            let millis = number.as_f64()?;
            if !millis.is_finite() {
                return None;
            }
            Utc.timestamp_millis_opt(millis.trunc() as i64).single()?
        }
        _ => return None,
    };
    (0..=MAX_YEAR).contains(&parsed.year()).then_some(parsed)
}

fn parse_ts_str(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Some(local) = raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        return parse_naive(local);
    }
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }
    if let Some(parsed) = parse_naive(raw) {
        return Some(parsed);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn parse_naive(raw: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Missing, `null` and empty-string fields all count as absent.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    match object.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(value)) if value.is_empty() => None,
        Some(value) => Some(value),
    }
}

fn required_string<'a>(
    index: usize,
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, ValidationError> {
    let value = present(object, field).ok_or_else(|| {
        ValidationError::item(
            index,
            Some(field),
            format!("Missing required field '{}'", field),
        )
    })?;
    value.as_str().ok_or_else(|| {
        ValidationError::item(index, Some(field), format!("'{}' must be a string", field))
    })
}

fn required_status_code(
    index: usize,
    object: &Map<String, Value>,
) -> Result<u16, ValidationError> {
    let field = "statusCode";
    let value = match object.get(field) {
        None | Some(Value::Null) => {
            return Err(ValidationError::item(
                index,
                Some(field),
                "Missing required field 'statusCode'",
            ));
        }
        Some(value) => value,
    };
    let number = value.as_f64().ok_or_else(|| {
        ValidationError::item(index, Some(field), "'statusCode' must be a number")
    })?;
    if number.fract() != 0.0 {
        return Err(ValidationError::item(
            index,
            Some(field),
            "'statusCode' must be an integer",
        ));
    }
    if !(100.0..=599.0).contains(&number) {
        return Err(ValidationError::item(
            index,
            Some(field),
            "'statusCode' must be between 100 and 599",
        ));
    }
    Ok(number as u16)
}
