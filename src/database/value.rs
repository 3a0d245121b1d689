use chrono::DateTime;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use duckdb::types::TimeUnit;
use duckdb::types::ToSqlOutput;
use duckdb::types::Value as DuckValue;
use duckdb::ToSql;
use std::fmt;

/// A scalar cell of a relational result, or a statement parameter.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    Integer(i64),
    Decimal(f64),
    Text(String),
    Boolean(bool),
    /// Date and time without zone, microsecond precision
    Timestamp(NaiveDateTime),
    #[default]
    Null,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floating point.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(value) => Some(*value as f64),
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Timestamp(value) => Some(*value),
            _ => None,
        }
    }
}

/// Converts an epoch offset in the given unit to a naive timestamp.
fn timestamp_from_epoch(unit: TimeUnit, value: i64) -> Option<NaiveDateTime> {
    let micros = match unit {
        TimeUnit::Second => value.checked_mul(1_000_000)?,
        TimeUnit::Millisecond => value.checked_mul(1_000)?,
        TimeUnit::Microsecond => value,
        TimeUnit::Nanosecond => value.div_euclid(1_000),
    };
    DateTime::from_timestamp_micros(micros).map(|datetime| datetime.naive_utc())
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(chrono::Duration::days(days.into()))?
        .and_hms_opt(0, 0, 0)
}

impl From<DuckValue> for Value {
    /// Narrows backend values onto the six scalar kinds.
    ///
    /// Integers that do not fit `i64` become decimals; dates become midnight
    /// timestamps; anything without a scalar counterpart is rendered as text.
    fn from(value: DuckValue) -> Self {
        match value {
            DuckValue::Null => Value::Null,
            DuckValue::Boolean(value) => Value::Boolean(value),
            DuckValue::TinyInt(value) => Value::Integer(value.into()),
            DuckValue::SmallInt(value) => Value::Integer(value.into()),
            DuckValue::Int(value) => Value::Integer(value.into()),
            DuckValue::BigInt(value) => Value::Integer(value),
            DuckValue::UTinyInt(value) => Value::Integer(value.into()),
            DuckValue::USmallInt(value) => Value::Integer(value.into()),
            DuckValue::UInt(value) => Value::Integer(value.into()),
            DuckValue::UBigInt(value) => i64::try_from(value)
                .map(Value::Integer)
                .unwrap_or(Value::Decimal(value as f64)),
            DuckValue::HugeInt(value) => i64::try_from(value)
                .map(Value::Integer)
                .unwrap_or(Value::Decimal(value as f64)),
            DuckValue::Float(value) => Value::Decimal(value.into()),
            DuckValue::Double(value) => Value::Decimal(value),
            DuckValue::Decimal(value) => {
                let text = value.to_string();
                text.parse::<f64>().map(Value::Decimal).unwrap_or(Value::Text(text))
            }
            DuckValue::Timestamp(unit, value) => timestamp_from_epoch(unit, value)
                .map(Value::Timestamp)
                .unwrap_or(Value::Integer(value)),
            DuckValue::Date32(days) => date_from_epoch_days(days)
                .map(Value::Timestamp)
                .unwrap_or(Value::Integer(days.into())),
            DuckValue::Text(value) | DuckValue::Enum(value) => Value::Text(value),
            DuckValue::Blob(bytes) => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
            other => Value::Text(format!("{other:?}")),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            Value::Integer(value) => DuckValue::BigInt(*value),
            Value::Decimal(value) => DuckValue::Double(*value),
            Value::Text(value) => DuckValue::Text(value.to_owned()),
            Value::Boolean(value) => DuckValue::Boolean(*value),
            Value::Timestamp(value) => DuckValue::Timestamp(TimeUnit::Microsecond, value.and_utc().timestamp_micros()),
            Value::Null => DuckValue::Null,
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Decimal(value) => write!(f, "{value}"),
            Value::Text(value) => f.write_str(value),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Timestamp(value) => write!(f, "{}", value.format("%Y-%m-%d %H:%M:%S%.f")),
            Value::Null => f.write_str("NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Decimal(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_from_backend() {
        assert_eq!(Value::from(DuckValue::Int(7)), Value::Integer(7));
        assert_eq!(Value::from(DuckValue::UBigInt(u64::MAX)), Value::Decimal(u64::MAX as f64));
        assert_eq!(Value::from(DuckValue::Float(1.5)), Value::Decimal(1.5));
        assert_eq!(Value::from(DuckValue::Text("x".to_owned())), Value::Text("x".to_owned()));
        assert_eq!(Value::from(DuckValue::Null), Value::Null);

        let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(12, 30, 0).unwrap();
        let micros = expected.and_utc().timestamp_micros();
        assert_eq!(Value::from(DuckValue::Timestamp(TimeUnit::Microsecond, micros)), Value::Timestamp(expected));
        assert_eq!(Value::from(DuckValue::Timestamp(TimeUnit::Second, micros / 1_000_000)), Value::Timestamp(expected));
        assert_eq!(
            Value::from(DuckValue::Date32(1)),
            Value::Timestamp(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn value_timestamp_binds_as_timestamp() {
        let timestamp = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_micro_opt(12, 30, 0, 250).unwrap();
        let value = Value::from(timestamp);
        let output = value.to_sql().unwrap();
        let ToSqlOutput::Owned(bound) = output else {
            panic!("timestamp should bind as an owned value");
        };
        assert_eq!(bound, DuckValue::Timestamp(TimeUnit::Microsecond, timestamp.and_utc().timestamp_micros()));
        assert_eq!(Value::from(bound), Value::Timestamp(timestamp));
    }

    #[test]
    fn value_accessors_and_display() {
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("a").as_i64(), None);
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)).as_bool(), Some(true));
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Decimal(2.5).to_string(), "2.5");
        let timestamp = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap();
        assert_eq!(Value::from(timestamp).to_string(), "2024-01-02 03:04:05");
    }
}
