//! Type-specific value checks. The only place dynamic values become typed.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use uuid::Uuid;

use crate::schema::FieldDefinition;
use crate::types::{
    EnumConstraints, FieldKind, IdStrategy, IdentifierConstraints, NumberConstraints,
    StringConstraints, TemporalConstraints, TimeFormat,
};

/// Checks a present value against the field's type and constraints.
///
/// # Returns
/// `Err(reason)` naming the violated constraint.
pub(super) fn check_value(field: &FieldDefinition, value: &Value) -> Result<(), String> {
    match &field.kind {
        FieldKind::Identifier(c) => check_identifier(c, value),
        FieldKind::String(c) => check_string(c, value),
        FieldKind::Number(c) => check_number(c, value),
        FieldKind::Enum(c) => check_enum(c, value),
        FieldKind::Temporal(c) => check_temporal(c, value),
        FieldKind::Unknown => Err(format!("unsupported field type '{}'", field.type_tag)),
    }
}

fn check_identifier(c: &IdentifierConstraints, value: &Value) -> Result<(), String> {
    match c.id_type {
        Some(IdStrategy::AutoIncrement) => positive_integer(value)
            .map(|_| ())
            .ok_or_else(|| "expected a positive integer identifier".to_string()),
        Some(IdStrategy::Uuid) => {
            if is_uuid(value) {
                Ok(())
            } else {
                Err("expected a UUID identifier".to_string())
            }
        }
        None => {
            if positive_integer(value).is_some() || is_uuid(value) {
                Ok(())
            } else {
                Err("expected a positive integer or UUID identifier".to_string())
            }
        }
    }
}

fn check_string(c: &StringConstraints, value: &Value) -> Result<(), String> {
    let Some(text) = value.as_str() else {
        return Err(format!("expected a string, got {}", kind_name(value)));
    };

    let length = text.chars().count();
    if let Some(min) = c.min_length {
        if length < min {
            return Err(format!("length {} is below min_length {}", length, min));
        }
    }
    if let Some(max) = c.max_length {
        if length > max {
            return Err(format!("length {} exceeds max_length {}", length, max));
        }
    }
    Ok(())
}

fn check_number(c: &NumberConstraints, value: &Value) -> Result<(), String> {
    let (number, text) = match value {
        Value::Number(n) => match n.as_f64() {
            Some(number) => (number, n.to_string()),
            None => return Err("expected a number".to_string()),
        },
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(number) => (number, s.trim().to_string()),
            Err(_) => return Err(format!("\"{}\" is not a number", s)),
        },
        other => return Err(format!("expected a number, got {}", kind_name(other))),
    };

    if !number.is_finite() {
        return Err("expected a finite number".to_string());
    }
    if let Some(min) = c.min_value {
        if number < min {
            return Err(format!("value {} is below min_value {}", text, min));
        }
    }
    if let Some(max) = c.max_value {
        if number > max {
            return Err(format!("value {} exceeds max_value {}", text, max));
        }
    }
    if let Some(precision) = c.precision {
        let digits = decimal_digits(&text);
        if digits > precision {
            return Err(format!(
                "value has {} decimal digits, precision is {}",
                digits, precision
            ));
        }
    }
    Ok(())
}

fn check_enum(c: &EnumConstraints, value: &Value) -> Result<(), String> {
    let Some(choice) = value.as_str() else {
        return Err(format!(
            "expected one of the allowed option values, got {}",
            kind_name(value)
        ));
    };
    if c.contains(choice) {
        Ok(())
    } else {
        Err(format!("value \"{}\" is not one of the allowed options", choice))
    }
}

fn check_temporal(c: &TemporalConstraints, value: &Value) -> Result<(), String> {
    let format = c.format();
    if format == TimeFormat::DateObject && value.as_i64().is_some_and(|ms| ms >= 0) {
        return Ok(());
    }

    let accepted = value.as_str().map(str::trim).is_some_and(|text| match format {
        TimeFormat::Date => is_date(text),
        TimeFormat::Time => is_time(text),
        TimeFormat::DateTime => is_datetime(text),
        TimeFormat::DateObject => is_date(text) || is_time(text) || is_datetime(text),
    });
    if accepted {
        return Ok(());
    }

    Err(match format {
        TimeFormat::Date => "expected a date in YYYY-MM-DD format".to_string(),
        TimeFormat::Time => "expected a time in HH:MM or HH:MM:SS format".to_string(),
        TimeFormat::DateTime => {
            "expected a date-time in RFC 3339 or YYYY-MM-DD HH:MM:SS format".to_string()
        }
        TimeFormat::DateObject => {
            "expected a date, time, date-time or epoch milliseconds".to_string()
        }
    })
}

fn positive_integer(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .filter(|id| *id > 0)
}

fn is_uuid(value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| Uuid::parse_str(s.trim()).is_ok())
}

fn is_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
}

fn is_time(text: &str) -> bool {
    NaiveTime::parse_from_str(text, "%H:%M:%S").is_ok()
        || NaiveTime::parse_from_str(text, "%H:%M").is_ok()
}

fn is_datetime(text: &str) -> bool {
    DateTime::parse_from_rfc3339(text).is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
}

/// Number of significant decimal digits in a numeric literal.
fn decimal_digits(text: &str) -> u32 {
    let lower = text.to_ascii_lowercase();
    let (mantissa, exponent) = match lower.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, parse_exponent(exponent)),
        None => (lower.as_str(), 0),
    };
    let fraction = mantissa
        .split_once('.')
        .map(|(_, fraction)| fraction.trim_end_matches('0'))
        .unwrap_or("");
    let digits = (fraction.len() as i64).saturating_sub(exponent);
    digits.clamp(0, u32::MAX as i64) as u32
}

/// Exponents beyond `i64` saturate toward their sign.
fn parse_exponent(text: &str) -> i64 {
    match text.parse::<i64>() {
        Ok(exponent) => exponent,
        Err(_) if text.starts_with('-') => i64::MIN,
        Err(_) if text.trim_start_matches('+').bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
        Err(_) => 0,
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
