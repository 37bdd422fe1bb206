//! Built-in converters from storage values to application values.
//!
//! Every converter passes `Null` through untouched. Anything else that cannot
//! be interpreted is reported back to the caster, which attaches the table
//! and column before surfacing the error.

use super::TypeConverter;
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

type Conversion = std::result::Result<Value, String>;

fn unsupported(type_name: &str, raw: &Value) -> Conversion {
    Err(format!(
        "cannot convert {} value to {type_name}",
        raw.type_name()
    ))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerType;

impl TypeConverter for IntegerType {
    fn name(&self) -> &str {
        "integer"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Integer(_) => Ok(raw),
            Value::Bool(b) => Ok(Value::Integer(i64::from(b))),
            #[allow(clippy::cast_possible_truncation)]
            Value::Float(f) => Ok(Value::Integer(f.trunc() as i64)),
            Value::Text(ref s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|e| format!("invalid integer '{s}': {e}")),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl TypeConverter for FloatType {
    fn name(&self) -> &str {
        "float"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Float(_) => Ok(raw),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(i) => Ok(Value::Float(i as f64)),
            Value::Text(ref s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| format!("invalid float '{s}': {e}")),
            other => unsupported(self.name(), &other),
        }
    }
}

/// Decimals stay textual so no precision is lost on the way in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalType;

impl TypeConverter for DecimalType {
    fn name(&self) -> &str {
        "decimal"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null => Ok(raw),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.parse::<f64>().is_err() {
                    return Err(format!("invalid decimal '{trimmed}'"));
                }
                Ok(Value::Text(trimmed.to_string()))
            }
            Value::Integer(i) => Ok(Value::Text(i.to_string())),
            Value::Float(f) => Ok(Value::Text(f.to_string())),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoolType;

impl TypeConverter for BoolType {
    fn name(&self) -> &str {
        "boolean"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Bool(_) => Ok(raw),
            Value::Integer(i) => Ok(Value::Bool(i != 0)),
            Value::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "t" | "true" | "y" | "yes" => Ok(Value::Bool(true)),
                "0" | "f" | "false" | "n" | "no" | "" => Ok(Value::Bool(false)),
                other => Err(format!("invalid boolean '{other}'")),
            },
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl TypeConverter for StringType {
    fn name(&self) -> &str {
        "string"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Text(_) => Ok(raw),
            Value::Integer(i) => Ok(Value::Text(i.to_string())),
            Value::Float(f) => Ok(Value::Text(f.to_string())),
            Value::Bool(b) => Ok(Value::Text(if b { "1" } else { "0" }.to_string())),
            Value::Uuid(u) => Ok(Value::Text(u.to_string())),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl TypeConverter for UuidType {
    fn name(&self) -> &str {
        "uuid"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Uuid(_) => Ok(raw),
            Value::Text(ref s) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|e| format!("invalid uuid '{s}': {e}")),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl TypeConverter for DateType {
    fn name(&self) -> &str {
        "date"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Date(_) => Ok(raw),
            Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
            Value::Text(ref s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| format!("invalid date '{s}': {e}")),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeType;

impl DateTimeType {
    const NAIVE_FORMATS: [&'static str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    fn parse(text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        Self::NAIVE_FORMATS.iter().find_map(|format| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
    }
}

impl TypeConverter for DateTimeType {
    fn name(&self) -> &str {
        "datetime"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::DateTime(_) => Ok(raw),
            Value::Integer(secs) => DateTime::<Utc>::from_timestamp(secs, 0)
                .map(Value::DateTime)
                .ok_or_else(|| format!("timestamp {secs} out of range")),
            Value::Text(ref s) => Self::parse(s.trim())
                .map(Value::DateTime)
                .ok_or_else(|| format!("invalid datetime '{s}'")),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeType;

impl TypeConverter for TimeType {
    fn name(&self) -> &str {
        "time"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Time(_) => Ok(raw),
            Value::Text(ref s) => NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f")
                .map(Value::Time)
                .map_err(|e| format!("invalid time '{s}': {e}")),
            other => unsupported(self.name(), &other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonType;

impl TypeConverter for JsonType {
    fn name(&self) -> &str {
        "json"
    }

    fn to_application_value(&self, raw: Value) -> Conversion {
        match raw {
            Value::Null | Value::Json(_) => Ok(raw),
            Value::Text(ref s) => serde_json::from_str(s)
                .map(Value::Json)
                .map_err(|e| format!("invalid json: {e}")),
            other => Ok(Value::Json(other.to_json())),
        }
    }
}
