//! Column converters
//!
//! Field types that SQLite cannot store directly are mapped to a stored form
//! by a pure `encode`/`decode` pair. Row mapping code reads such columns
//! through [`read_column`] / [`read_optional_column`], which report decode
//! failures as `rusqlite::Error::FromSqlConversionFailure`.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, ToSql, Type};
use rusqlite::Row;
use thiserror::Error;

use crate::models::{ImageLink, IntData};

/// A stored value that could not be decoded
#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("invalid integer '{0}' in integer list")]
    InvalidInteger(String),

    #[error("malformed JSON column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),
}

/// Maps one in-memory field type to and from its stored form
pub trait ColumnConverter {
    /// In-memory type
    type Value;
    /// Type handed to SQLite
    type Stored: ToSql + FromSql;
    /// SQLite type reported when decoding fails
    const SQL_TYPE: Type;

    fn encode(value: &Self::Value) -> Self::Stored;

    fn decode(stored: Self::Stored) -> Result<Self::Value, ConversionError>;
}

/// `DateTime<Utc>` as epoch milliseconds
pub struct DateConverter;

impl ColumnConverter for DateConverter {
    type Value = DateTime<Utc>;
    type Stored = i64;
    const SQL_TYPE: Type = Type::Integer;

    fn encode(value: &DateTime<Utc>) -> i64 {
        value.timestamp_millis()
    }

    fn decode(stored: i64) -> Result<DateTime<Utc>, ConversionError> {
        DateTime::from_timestamp_millis(stored).ok_or(ConversionError::TimestampOutOfRange(stored))
    }
}

/// `Vec<i64>` as comma separated text
pub struct IntListConverter;

impl ColumnConverter for IntListConverter {
    type Value = Vec<i64>;
    type Stored = String;
    const SQL_TYPE: Type = Type::Text;

    fn encode(value: &Vec<i64>) -> String {
        value
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn decode(stored: String) -> Result<Vec<i64>, ConversionError> {
        if stored.trim().is_empty() {
            return Ok(Vec::new());
        }
        stored
            .split(',')
            .map(str::trim)
            .map(|s| {
                s.parse()
                    .map_err(|_| ConversionError::InvalidInteger(s.to_string()))
            })
            .collect()
    }
}

/// `Vec<IntData>` as a JSON array
pub struct IntDataListConverter;

impl ColumnConverter for IntDataListConverter {
    type Value = Vec<IntData>;
    type Stored = String;
    const SQL_TYPE: Type = Type::Text;

    fn encode(value: &Vec<IntData>) -> String {
        // Serializing plain integer pairs cannot fail
        serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
    }

    fn decode(stored: String) -> Result<Vec<IntData>, ConversionError> {
        Ok(serde_json::from_str(&stored)?)
    }
}

/// `Vec<ImageLink>` as a JSON array
pub struct ImageLinkListConverter;

impl ColumnConverter for ImageLinkListConverter {
    type Value = Vec<ImageLink>;
    type Stored = String;
    const SQL_TYPE: Type = Type::Text;

    fn encode(value: &Vec<ImageLink>) -> String {
        serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
    }

    fn decode(stored: String) -> Result<Vec<ImageLink>, ConversionError> {
        Ok(serde_json::from_str(&stored)?)
    }
}

/// Read and decode a non-null converted column
pub fn read_column<C: ColumnConverter>(row: &Row, idx: usize) -> rusqlite::Result<C::Value> {
    let stored: C::Stored = row.get(idx)?;
    C::decode(stored)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, C::SQL_TYPE, Box::new(e)))
}

/// Read and decode a nullable converted column
pub fn read_optional_column<C: ColumnConverter>(
    row: &Row,
    idx: usize,
) -> rusqlite::Result<Option<C::Value>> {
    let stored: Option<C::Stored> = row.get(idx)?;
    stored
        .map(C::decode)
        .transpose()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, C::SQL_TYPE, Box::new(e)))
}

/// Encode an optional value for a nullable column
pub fn encode_optional<C: ColumnConverter>(value: Option<&C::Value>) -> Option<C::Stored> {
    value.map(C::encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rusqlite::Connection;

    #[test]
    fn test_date_converter() {
        let date = Utc.with_ymd_and_hms(2019, 3, 14, 9, 30, 0).unwrap();
        let stored = DateConverter::encode(&date);
        assert_eq!(stored, 1_552_555_800_000);
        assert_eq!(DateConverter::decode(stored).unwrap(), date);
    }

    #[test]
    fn test_date_converter_out_of_range() {
        let err = DateConverter::decode(i64::MAX).unwrap_err();
        assert!(matches!(err, ConversionError::TimestampOutOfRange(_)));
    }

    #[test]
    fn test_int_list_converter() {
        assert_eq!(IntListConverter::encode(&vec![3, 1, 20]), "3,1,20");
        assert_eq!(IntListConverter::encode(&Vec::new()), "");
        assert_eq!(
            IntListConverter::decode("3, 1,20".to_string()).unwrap(),
            vec![3, 1, 20]
        );
        assert!(IntListConverter::decode(String::new()).unwrap().is_empty());
    }

    #[test]
    fn test_int_list_converter_rejects_garbage() {
        let err = IntListConverter::decode("1,two,3".to_string()).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidInteger(ref s) if s == "two"));
    }

    #[test]
    fn test_int_list_converter_rejects_empty_element() {
        for stored in ["1,,2", "1, ,2", "1,2,", ",1"] {
            let err = IntListConverter::decode(stored.to_string()).unwrap_err();
            assert!(matches!(err, ConversionError::InvalidInteger(ref s) if s.is_empty()));
        }
        let blank = IntListConverter::decode("  ".to_string()).unwrap();
        assert!(blank.is_empty());
    }

    #[test]
    fn test_int_data_list_converter() {
        let stored = IntDataListConverter::encode(&vec![IntData::new(4, 9)]);
        assert_eq!(stored, r#"[{"key":4,"value":9}]"#);
        assert!(IntDataListConverter::decode("not json".to_string()).is_err());
    }

    #[test]
    fn test_image_link_list_converter() {
        let links = vec![
            ImageLink {
                link: "https://img.example.com/a.jpg".to_string(),
                caption: Some("Front page".to_string()),
            },
            ImageLink {
                link: "https://img.example.com/b.jpg".to_string(),
                caption: None,
            },
        ];
        let stored = ImageLinkListConverter::encode(&links);
        assert_eq!(ImageLinkListConverter::decode(stored).unwrap(), links);
    }

    #[test]
    fn test_read_column_reports_conversion_failure() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row("SELECT 'x,1'", [], |row| {
            read_column::<IntListConverter>(row, 0)
        });

        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _))
        ));
    }

    #[test]
    fn test_read_optional_column_null() {
        let conn = Connection::open_in_memory().unwrap();
        let value = conn
            .query_row("SELECT NULL", [], |row| {
                read_optional_column::<DateConverter>(row, 0)
            })
            .unwrap();
        assert!(value.is_none());
    }
}
