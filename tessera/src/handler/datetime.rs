use alloc::string::String;
use core::fmt::Write;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use tessera_core::{DateField, FieldDescriptor, TimeResolution, Value};

use crate::{DeserializeError, Deformatter, Deserializer, Formatter, SerializeError, Serializer};

pub(super) fn can_export(value: &Value) -> bool {
    matches!(value, Value::DateTime(_))
}

pub(super) fn export<F: Formatter>(
    serializer: &mut Serializer<'_, F>,
    running: &mut F::Running,
    field: &FieldDescriptor,
    value: &Value,
) -> Result<(), SerializeError> {
    let Value::DateTime(date) = value else {
        return Ok(());
    };
    let formatter = serializer.formatter();

    if let Some(unix) = field.unix_time_settings() {
        let timestamp = match unix.resolution {
            TimeResolution::Seconds => date.timestamp(),
            TimeResolution::Milliseconds => date.timestamp_millis(),
            TimeResolution::Microseconds => date.timestamp_micros(),
        };
        return formatter.serialize_int(running, field, timestamp);
    }

    let settings = field.date_settings();
    let date = match settings.and_then(|s| s.timezone) {
        Some(offset) => date.with_timezone(&offset),
        None => *date,
    };
    let text = match settings.and_then(|s| s.format.as_deref()) {
        Some(format) => {
            let mut text = String::new();
            write!(text, "{}", date.format(format)).map_err(|_| {
                SerializeError::InvalidDateFormat {
                    field: field.name.clone(),
                    format: format.into(),
                }
            })?;
            text
        }
        None => date.to_rfc3339(),
    };
    formatter.serialize_string(running, field, &text)
}

pub(super) fn import<D: Deformatter>(
    deserializer: &mut Deserializer<'_, D>,
    decoded: &mut D::Decoded,
    field: &FieldDescriptor,
) -> Result<Option<Value>, DeserializeError> {
    let deformatter = deserializer.deformatter();

    if let Some(unix) = field.unix_time_settings() {
        let timestamp = match deformatter.deserialize_int(decoded, field)? {
            None => return Ok(None),
            Some(Value::Null) => return Ok(Some(Value::Null)),
            Some(Value::Int(timestamp)) => timestamp,
            Some(other) => {
                return Err(DeserializeError::TypeMismatch {
                    field: field.name.clone(),
                    expected: "int",
                    found: other.kind().name(),
                });
            }
        };
        let date = match unix.resolution {
            TimeResolution::Seconds => DateTime::from_timestamp(timestamp, 0),
            TimeResolution::Milliseconds => DateTime::from_timestamp_millis(timestamp),
            TimeResolution::Microseconds => DateTime::from_timestamp_micros(timestamp),
        };
        return date
            .map(|d| Some(Value::DateTime(d.fixed_offset())))
            .ok_or_else(|| DeserializeError::InvalidDate {
                field: field.name.clone(),
                input: alloc::format!("{timestamp}"),
            });
    }

    let text = match deformatter.deserialize_string(decoded, field)? {
        None => return Ok(None),
        Some(Value::Null) => return Ok(Some(Value::Null)),
        Some(Value::String(text)) => text,
        Some(other) => {
            return Err(DeserializeError::TypeMismatch {
                field: field.name.clone(),
                expected: "string",
                found: other.kind().name(),
            });
        }
    };
    parse(&text, field.date_settings())
        .map(|d| Some(Value::DateTime(d)))
        .ok_or_else(|| DeserializeError::InvalidDate {
            field: field.name.clone(),
            input: text,
        })
}

/// Parses a date string; strings without an offset take the field's
/// timezone, or UTC.
fn parse(text: &str, settings: Option<&DateField>) -> Option<DateTime<FixedOffset>> {
    let Some(format) = settings.and_then(|s| s.format.as_deref()) else {
        return DateTime::parse_from_rfc3339(text).ok();
    };
    if let Ok(date) = DateTime::parse_from_str(text, format) {
        return Some(date);
    }
    let offset = settings.and_then(|s| s.timezone).unwrap_or_else(|| Utc.fix());
    let naive = NaiveDateTime::parse_from_str(text, format).ok().or_else(|| {
        NaiveDate::parse_from_str(text, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })?;
    offset.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_by_default() {
        tessera_testhelpers::setup();
        let date = parse("2024-03-01T12:30:00+02:00", None).unwrap();
        assert_eq!(date.timestamp(), 1_709_289_000);
        assert_eq!(date.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn naive_formats_take_the_field_timezone() {
        tessera_testhelpers::setup();
        let settings = DateField {
            format: Some("%Y-%m-%d".into()),
            timezone: FixedOffset::east_opt(3600),
        };
        let date = parse("2024-03-01", Some(&settings)).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T00:00:00+01:00");

        let utc = DateField {
            format: Some("%Y-%m-%d %H:%M".into()),
            timezone: None,
        };
        let date = parse("2024-03-01 08:15", Some(&utc)).unwrap();
        assert_eq!(date.to_rfc3339(), "2024-03-01T08:15:00+00:00");
        assert!(parse("yesterday", Some(&utc)).is_none());
    }
}
