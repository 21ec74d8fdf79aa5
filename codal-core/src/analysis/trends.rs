//! Trend aggregation: per-symbol price/volume statistics and per-month counts.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use polars::prelude::DataFrame;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::info;

use crate::data::table::{date_values, numeric_values, text_values};
use crate::data::DataError;
use crate::stats::{max, mean, min, round_to, sample_std};

/// Aggregates are reported to this many decimal places.
const DECIMALS: i32 = 2;

/// A calendar month. Orders chronologically and renders as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeStats {
    pub sum: f64,
    pub mean: Option<f64>,
}

/// Aggregates for one symbol. `price` / `volume` are absent when the table
/// had no such column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolTrend {
    #[serde(skip)]
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<VolumeStats>,
}

/// Trend summary. Serializes as a JSON object with up to two keys;
/// `by_symbol` maps symbol → aggregates in first-appearance order and
/// `trend_over_time` maps `YYYY-MM` → row count in ascending order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TrendSummary {
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_by_symbol"
    )]
    pub by_symbol: Option<Vec<SymbolTrend>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend_over_time: Option<BTreeMap<YearMonth, usize>>,
}

impl TrendSummary {
    /// True when neither summary could be computed.
    pub fn is_empty(&self) -> bool {
        self.by_symbol.is_none() && self.trend_over_time.is_none()
    }

    pub fn symbol(&self, symbol: &str) -> Option<&SymbolTrend> {
        self.by_symbol
            .as_ref()?
            .iter()
            .find(|t| t.symbol == symbol)
    }
}

fn serialize_by_symbol<S: Serializer>(
    groups: &Option<Vec<SymbolTrend>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let groups = groups.as_deref().unwrap_or_default();
    let mut map = serializer.serialize_map(Some(groups.len()))?;
    for group in groups {
        map.serialize_entry(&group.symbol, group)?;
    }
    map.end()
}

/// Aggregate a cleaned table. `Ok(None)` for a missing or empty table.
pub fn analyze_trends(df: Option<&DataFrame>) -> Result<Option<TrendSummary>, DataError> {
    let Some(df) = df else {
        return Ok(None);
    };
    if df.height() == 0 {
        return Ok(None);
    }

    info!(rows = df.height(), "analyzing market trends");

    let mut summary = TrendSummary::default();

    if let Some(symbols) = text_values(df, "symbol")? {
        let prices = numeric_values(df, "price")?;
        let volumes = numeric_values(df, "volume")?;
        summary.by_symbol = Some(group_by_symbol(
            &symbols,
            prices.as_deref(),
            volumes.as_deref(),
        ));
    }

    if let Some(dates) = date_values(df, "date")? {
        let mut counts: BTreeMap<YearMonth, usize> = BTreeMap::new();
        for date in dates.into_iter().flatten() {
            *counts.entry(YearMonth::of(date)).or_insert(0) += 1;
        }
        summary.trend_over_time = Some(counts);
    }

    Ok(Some(summary))
}

fn group_by_symbol(
    symbols: &[Option<String>],
    prices: Option<&[Option<f64>]>,
    volumes: Option<&[Option<f64>]>,
) -> Vec<SymbolTrend> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();

    for (row, symbol) in symbols.iter().enumerate() {
        let Some(symbol) = symbol.as_deref() else {
            continue;
        };
        let slot = *index.entry(symbol).or_insert_with(|| {
            groups.push((symbol, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    groups
        .into_iter()
        .map(|(symbol, rows)| SymbolTrend {
            symbol: symbol.to_string(),
            price: prices.map(|p| price_stats(&collect_rows(p, &rows))),
            volume: volumes.map(|v| volume_stats(&collect_rows(v, &rows))),
        })
        .collect()
}

fn collect_rows(values: &[Option<f64>], rows: &[usize]) -> Vec<f64> {
    rows.iter().filter_map(|&i| values[i]).collect()
}

fn round(v: f64) -> f64 {
    round_to(v, DECIMALS)
}

fn price_stats(values: &[f64]) -> PriceStats {
    PriceStats {
        mean: mean(values).map(round),
        std: sample_std(values).map(round),
        min: min(values).map(round),
        max: max(values).map(round),
    }
}

fn volume_stats(values: &[f64]) -> VolumeStats {
    VolumeStats {
        sum: round(values.iter().sum()),
        mean: mean(values).map(round),
    }
}
