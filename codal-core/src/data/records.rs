//! Company and report records.
//!
//! `CompanyRecord` types the three fields every consumer reads and carries
//! whatever else the provider sent in `extra`. Reports arrive as free-form
//! JSON objects (`RawRecord`) since providers may add columns such as
//! `publish_date` or `fiscal_date`; the typed `ReportRecord` is what the
//! synthetic generator produces and is flattened into the same raw shape
//! before it reaches the table builder.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A report row exactly as a provider delivered it.
pub type RawRecord = Map<String, Value>;

/// A listed company. Identity is `symbol`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompanyRecord {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    /// Provider fields beyond the three above, in delivery order.
    pub extra: RawRecord,
}

impl CompanyRecord {
    pub fn new(symbol: &str, name: &str, sector: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector: sector.to_string(),
            extra: RawRecord::new(),
        }
    }

    /// Adapt one provider object. Null or missing `name`/`sector` become
    /// empty, non-text values use their JSON text. `None` when there is no
    /// usable symbol.
    pub fn from_raw(raw: &RawRecord) -> Option<Self> {
        let symbol = text_field(raw, "symbol").filter(|s| !s.is_empty())?;
        let extra = raw
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "symbol" | "name" | "sector"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Some(Self {
            symbol,
            name: text_field(raw, "name").unwrap_or_default(),
            sector: text_field(raw, "sector").unwrap_or_default(),
            extra,
        })
    }

    /// `symbol`, `name`, `sector`, then the extra fields.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = Map::new();
        raw.insert("symbol".into(), Value::String(self.symbol.clone()));
        raw.insert("name".into(), Value::String(self.name.clone()));
        raw.insert("sector".into(), Value::String(self.sector.clone()));
        for (k, v) in &self.extra {
            raw.insert(k.clone(), v.clone());
        }
        raw
    }
}

fn text_field(raw: &RawRecord, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// Reporting period classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Interim,
    Annual,
}

impl ReportType {
    /// Synthetic reports alternate period type by position: even rows are interim.
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 {
            ReportType::Interim
        } else {
            ReportType::Annual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Interim => "interim",
            ReportType::Annual => "annual",
        }
    }
}

/// One financial report for one symbol and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub symbol: String,
    pub date: Option<NaiveDate>,
    pub revenue: Option<i64>,
    pub net_profit: Option<i64>,
    pub price: Option<i64>,
    pub volume: Option<i64>,
    pub report_type: ReportType,
}

impl ReportRecord {
    /// Flatten into the provider's wire shape: dates as `YYYY-MM-DD` text,
    /// amounts as JSON integers, missing values as JSON null.
    pub fn to_raw(&self) -> RawRecord {
        let mut raw = Map::new();
        raw.insert("symbol".into(), Value::String(self.symbol.clone()));
        raw.insert(
            "date".into(),
            self.date
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
        );
        raw.insert("revenue".into(), opt_int(self.revenue));
        raw.insert("net_profit".into(), opt_int(self.net_profit));
        raw.insert("price".into(), opt_int(self.price));
        raw.insert("volume".into(), opt_int(self.volume));
        raw.insert(
            "report_type".into(),
            Value::String(self.report_type.as_str().to_string()),
        );
        raw
    }
}

fn opt_int(v: Option<i64>) -> Value {
    v.map(Value::from).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(v: Value) -> RawRecord {
        match v {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn company_missing_or_null_fields_become_empty() {
        let c = CompanyRecord::from_raw(&raw(serde_json::json!({"symbol": "فولاد"}))).unwrap();
        assert_eq!(c.symbol, "فولاد");
        assert!(c.name.is_empty());
        assert!(c.sector.is_empty());

        let c = CompanyRecord::from_raw(&raw(serde_json::json!({
            "symbol": "وبملت", "name": null, "sector": "بانک"
        })))
        .unwrap();
        assert!(c.name.is_empty());
        assert_eq!(c.sector, "بانک");
    }

    #[test]
    fn numeric_symbol_uses_its_text() {
        let c = CompanyRecord::from_raw(&raw(serde_json::json!({"symbol": 4021, "name": 7})))
            .unwrap();
        assert_eq!(c.symbol, "4021");
        assert_eq!(c.name, "7");
    }

    #[test]
    fn company_without_symbol_is_rejected() {
        assert!(CompanyRecord::from_raw(&raw(serde_json::json!({"name": "x"}))).is_none());
        assert!(CompanyRecord::from_raw(&raw(serde_json::json!({"symbol": null}))).is_none());
        assert!(CompanyRecord::from_raw(&raw(serde_json::json!({"symbol": " "}))).is_none());
    }

    #[test]
    fn extra_fields_survive_in_order() {
        let c = CompanyRecord::from_raw(&raw(serde_json::json!({
            "isin": "IRO1FOLD0001", "symbol": "فولاد", "market": "bourse", "name": "فولاد مبارکه"
        })))
        .unwrap();
        let raw_out = c.to_raw();
        let keys: Vec<&str> = raw_out.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, ["symbol", "name", "sector", "isin", "market"]);
        assert_eq!(c.extra["market"], "bourse");
    }

    #[test]
    fn report_type_alternates_from_interim() {
        assert_eq!(ReportType::for_index(0), ReportType::Interim);
        assert_eq!(ReportType::for_index(1), ReportType::Annual);
        assert_eq!(ReportType::for_index(4), ReportType::Interim);
    }

    #[test]
    fn report_type_serializes_lowercase() {
        let json = serde_json::to_string(&ReportType::Annual).unwrap();
        assert_eq!(json, r#""annual""#);
    }

    #[test]
    fn to_raw_keeps_column_order_and_nulls() {
        let record = ReportRecord {
            symbol: "SPY".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
            revenue: Some(1_000_000),
            net_profit: None,
            price: Some(4_200),
            volume: Some(150_000),
            report_type: ReportType::Interim,
        };
        let raw = record.to_raw();
        let keys: Vec<&str> = raw.keys().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            ["symbol", "date", "revenue", "net_profit", "price", "volume", "report_type"]
        );
        assert_eq!(raw["date"], Value::String("2024-03-01".into()));
        assert_eq!(raw["net_profit"], Value::Null);
        assert_eq!(raw["report_type"], Value::String("interim".into()));
    }
}
