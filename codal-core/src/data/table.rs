//! Table construction and typed column access.
//!
//! Raw provider records become a `DataFrame` whose column set is the union of
//! record keys in first-seen order. Missing keys are null. Each column's type
//! is inferred from the JSON values it holds:
//!
//! | values (ignoring nulls) | column type |
//! | ----------------------- | ----------- |
//! | integers only           | `Int64`     |
//! | numbers                 | `Float64`   |
//! | booleans only           | `Boolean`   |
//! | strings only            | `String`    |
//! | anything mixed          | `String` (non-strings as JSON text) |
//! | none                    | `String` (all null) |

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use serde_json::Value;

use super::provider::DataError;
use super::records::{CompanyRecord, RawRecord};

static JSON_NULL: Value = Value::Null;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Mixed,
}

fn kind_of(value: &Value) -> ValueKind {
    match value {
        Value::Null => ValueKind::Null,
        Value::Bool(_) => ValueKind::Bool,
        Value::Number(n) if n.is_i64() => ValueKind::Int,
        Value::Number(_) => ValueKind::Float,
        Value::String(_) => ValueKind::Text,
        Value::Array(_) | Value::Object(_) => ValueKind::Mixed,
    }
}

fn infer_kind(values: &[&Value]) -> ValueKind {
    values.iter().fold(ValueKind::Null, |acc, v| {
        match (acc, kind_of(v)) {
            (acc, ValueKind::Null) => acc,
            (ValueKind::Null, k) => k,
            (a, b) if a == b => a,
            (ValueKind::Int, ValueKind::Float) | (ValueKind::Float, ValueKind::Int) => {
                ValueKind::Float
            }
            _ => ValueKind::Mixed,
        }
    })
}

fn build_column(name: &str, values: &[&Value]) -> Column {
    match infer_kind(values) {
        ValueKind::Bool => {
            let v: Vec<Option<bool>> = values.iter().map(|v| v.as_bool()).collect();
            Column::new(name.into(), v)
        }
        ValueKind::Int => {
            let v: Vec<Option<i64>> = values.iter().map(|v| v.as_i64()).collect();
            Column::new(name.into(), v)
        }
        ValueKind::Float => {
            let v: Vec<Option<f64>> = values.iter().map(|v| v.as_f64()).collect();
            Column::new(name.into(), v)
        }
        ValueKind::Null | ValueKind::Text | ValueKind::Mixed => {
            let v: Vec<Option<String>> = values
                .iter()
                .map(|v| match v {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Column::new(name.into(), v)
        }
    }
}

/// Build a table from raw records, preserving record order.
pub fn records_to_frame(records: &[RawRecord]) -> Result<DataFrame, DataError> {
    let mut seen = HashSet::new();
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        for key in record.keys() {
            if seen.insert(key.as_str()) {
                names.push(key.as_str());
            }
        }
    }

    let columns: Vec<Column> = names
        .iter()
        .map(|name| {
            let values: Vec<&Value> = records
                .iter()
                .map(|r| r.get(*name).unwrap_or(&JSON_NULL))
                .collect();
            build_column(name, &values)
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Company list as a table: `symbol`, `name`, `sector`, then any extra
/// provider fields. An empty list still has the three named columns.
pub fn companies_to_frame(companies: &[CompanyRecord]) -> Result<DataFrame, DataError> {
    if companies.is_empty() {
        let empty: [Option<&str>; 0] = [];
        return Ok(DataFrame::new(
            ["symbol", "name", "sector"]
                .into_iter()
                .map(|name| Column::new(name.into(), &empty))
                .collect(),
        )?);
    }
    let records: Vec<RawRecord> = companies.iter().map(CompanyRecord::to_raw).collect();
    records_to_frame(&records)
}

// ── Column access ───────────────────────────────────────────────────

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

pub fn is_numeric(dtype: &DataType) -> bool {
    dtype.is_integer() || dtype.is_float()
}

/// Values of a column as `f64`. `None` when the column is absent; a
/// non-numeric column reads as all nulls. NaN reads as null.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>, DataError> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let column = df.column(name)?;
    if !is_numeric(column.dtype()) {
        return Ok(Some(vec![None; df.height()]));
    }

    let floats = column.cast(&DataType::Float64)?;
    let values = floats
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(Some(values))
}

/// Values of a column as calendar dates. `None` when the column is absent.
/// Text is parsed leniently, datetimes are truncated, other types read as null.
pub fn date_values(
    df: &DataFrame,
    name: &str,
) -> Result<Option<Vec<Option<NaiveDate>>>, DataError> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let column = df.column(name)?;

    let values = match column.dtype() {
        DataType::Date => days_to_dates(column)?,
        DataType::Datetime(_, _) => days_to_dates(&column.cast(&DataType::Date)?)?,
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_date))
            .collect(),
        _ => vec![None; df.height()],
    };
    Ok(Some(values))
}

/// Values of a column rendered as text. `None` when the column is absent.
pub fn text_values(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<String>>>, DataError> {
    if !has_column(df, name) {
        return Ok(None);
    }
    let text = df.column(name)?.cast(&DataType::String)?;
    let values = text
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_owned))
        .collect();
    Ok(Some(values))
}

fn days_to_dates(column: &Column) -> Result<Vec<Option<NaiveDate>>, DataError> {
    let epoch = NaiveDate::default(); // 1970-01-01
    let days = column.cast(&DataType::Int32)?;
    Ok(days
        .i32()?
        .into_iter()
        .map(|d| d.and_then(|d| epoch.checked_add_signed(chrono::Duration::days(d as i64))))
        .collect())
}

/// Build a `Date` column from optional calendar dates.
pub fn date_column(name: &str, dates: &[Option<NaiveDate>]) -> Result<Column, DataError> {
    let epoch = NaiveDate::default(); // 1970-01-01
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|d| d.map(|d| (d - epoch).num_days() as i32))
        .collect();
    Ok(Column::new(name.into(), days).cast(&DataType::Date)?)
}

/// Parse a calendar date from common provider spellings. Returns `None`
/// instead of failing.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(v: Value) -> RawRecord {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn columns_are_union_in_first_seen_order() {
        let records = vec![
            raw(json!({"symbol": "A", "price": 10})),
            raw(json!({"symbol": "B", "publish_date": "2024-01-02", "price": 11})),
        ];
        let df = records_to_frame(&records).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["symbol", "price", "publish_date"]);
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("publish_date").unwrap().null_count(), 1);
    }

    #[test]
    fn column_types_are_inferred() {
        let records = vec![
            raw(json!({"i": 1, "f": 1, "b": true, "s": "x", "m": 1, "n": null})),
            raw(json!({"i": 2, "f": 2.5, "b": false, "s": "y", "m": "two", "n": null})),
        ];
        let df = records_to_frame(&records).unwrap();
        assert_eq!(df.column("i").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("f").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("b").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("s").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("m").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("n").unwrap().dtype(), &DataType::String);

        let mixed = text_values(&df, "m").unwrap().unwrap();
        assert_eq!(mixed, vec![Some("1".to_string()), Some("two".to_string())]);
    }

    #[test]
    fn empty_records_make_empty_frame() {
        let df = records_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 0);
    }

    #[test]
    fn companies_frame_has_three_columns() {
        let df = companies_to_frame(&[CompanyRecord::new("بانک", "بانک ملی ایران", "بانک‌ها")])
            .unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["symbol", "name", "sector"]);
        assert_eq!(df.height(), 1);
    }

    #[test]
    fn companies_frame_keeps_extra_provider_fields() {
        let first = CompanyRecord::from_raw(&raw(json!({
            "symbol": "فولاد", "name": null, "sector": "فلزات اساسی", "isin": "IRO1FOLD0001"
        })))
        .unwrap();
        let second = CompanyRecord::from_raw(&raw(json!({"symbol": "شستا", "market_cap": 12})))
            .unwrap();
        let df = companies_to_frame(&[first, second]).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["symbol", "name", "sector", "isin", "market_cap"]);
        assert_eq!(
            text_values(&df, "isin").unwrap().unwrap(),
            vec![Some("IRO1FOLD0001".to_string()), None]
        );
        assert_eq!(numeric_values(&df, "market_cap").unwrap(), Some(vec![None, Some(12.0)]));
    }

    #[test]
    fn empty_company_list_keeps_named_columns() {
        let df = companies_to_frame(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn numeric_values_absent_vs_textual() {
        let df = records_to_frame(&[raw(json!({"price": "12", "volume": 5}))]).unwrap();
        assert_eq!(numeric_values(&df, "missing").unwrap(), None);
        assert_eq!(numeric_values(&df, "price").unwrap(), Some(vec![None]));
        assert_eq!(numeric_values(&df, "volume").unwrap(), Some(vec![Some(5.0)]));
    }

    #[test]
    fn date_values_from_text_and_date_columns() {
        let df = records_to_frame(&[
            raw(json!({"date": "2024-02-29"})),
            raw(json!({"date": "garbage"})),
        ])
        .unwrap();
        let dates = date_values(&df, "date").unwrap().unwrap();
        assert_eq!(dates, vec![NaiveDate::from_ymd_opt(2024, 2, 29), None]);

        let col = date_column("date", &dates).unwrap();
        assert_eq!(col.dtype(), &DataType::Date);
        let df = DataFrame::new(vec![col]).unwrap();
        assert_eq!(date_values(&df, "date").unwrap().unwrap(), dates);
    }

    #[test]
    fn parse_date_accepts_common_spellings() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15);
        assert_eq!(parse_date("2024-03-15"), expected);
        assert_eq!(parse_date(" 2024/03/15 "), expected);
        assert_eq!(parse_date("20240315"), expected);
        assert_eq!(parse_date("2024-03-15T10:30:00+03:30"), expected);
        assert_eq!(parse_date("2024-03-15 10:30:00"), expected);
        assert_eq!(parse_date("2024-03-15T10:30:00.250"), expected);
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2023-02-29"), None);
    }
}
