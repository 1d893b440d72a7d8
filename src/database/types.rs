//! MySQL type mapping to JSON-friendly values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use sqlx::mysql::{MySql, MySqlRow};
use sqlx::{Column, Decode, Row, Type, TypeInfo, ValueRef};
use tracing::debug;

/// A SQL value that can be serialized to JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Decimal(Decimal),
    String(String),
    #[serde(serialize_with = "serialize_hex")]
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
}

/// Binary values are rendered as `0x`-prefixed lowercase hex.
#[allow(clippy::ptr_arg)]
fn serialize_hex<S: Serializer>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    serializer.serialize_str(&out)
}

/// Type mapper for converting MySQL column values.
pub struct TypeMapper;

impl TypeMapper {
    /// Extract a value from a row column, falling back to text and then raw
    /// bytes when the declared type cannot be decoded directly.
    pub fn extract_column(row: &MySqlRow, idx: usize) -> SqlValue {
        let Some(column) = row.columns().get(idx) else {
            return SqlValue::Null;
        };

        match row.try_get_raw(idx) {
            Ok(raw) if raw.is_null() => return SqlValue::Null,
            Ok(_) => {}
            Err(_) => return SqlValue::Null,
        }

        let type_name = column.type_info().name();
        let typed = match type_name {
            "BOOLEAN" => decode::<bool>(row, idx).map(SqlValue::Bool),
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
                decode::<i64>(row, idx).map(SqlValue::I64)
            }
            "YEAR" => decode::<u16>(row, idx)
                .map(|year| SqlValue::U64(year.into()))
                .or_else(|| decode::<i64>(row, idx).map(SqlValue::I64)),
            name if name.ends_with("UNSIGNED") => decode::<u64>(row, idx).map(SqlValue::U64),
            "FLOAT" | "DOUBLE" => decode::<f64>(row, idx).map(SqlValue::F64),
            "DECIMAL" => decode::<Decimal>(row, idx).map(SqlValue::Decimal),
            "DATE" => decode::<NaiveDate>(row, idx).map(SqlValue::Date),
            "TIME" => decode::<NaiveTime>(row, idx).map(SqlValue::Time),
            "DATETIME" => decode::<NaiveDateTime>(row, idx).map(SqlValue::DateTime),
            "TIMESTAMP" => decode::<DateTime<Utc>>(row, idx).map(SqlValue::DateTimeUtc),
            "JSON" => decode::<serde_json::Value>(row, idx).map(SqlValue::Json),
            _ => None,
        };

        typed.unwrap_or_else(|| {
            debug!(
                "Falling back to text decoding for column '{}' of type {}",
                column.name(),
                type_name
            );
            Self::extract_fallback(row, idx)
        })
    }

    fn extract_fallback(row: &MySqlRow, idx: usize) -> SqlValue {
        if let Some(text) = decode::<String>(row, idx) {
            return SqlValue::String(text);
        }

        match decode::<Vec<u8>>(row, idx) {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => SqlValue::String(text),
                Err(e) => SqlValue::Bytes(e.into_bytes()),
            },
            None => SqlValue::Null,
        }
    }
}

fn decode<'r, T>(row: &'r MySqlRow, idx: usize) -> Option<T>
where
    T: Decode<'r, MySql> + Type<MySql>,
{
    row.try_get::<T, _>(idx).ok()
}
