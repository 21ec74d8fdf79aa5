//! Feature extraction.
//!
//! Each feature is an explicit optional column, computed only when its
//! source columns exist:
//!
//! | feature            | requires                                  |
//! | ------------------ | ----------------------------------------- |
//! | `profit_margin`    | `revenue`, `net_profit`                   |
//! | `revenue_growth`   | `revenue`, `net_profit`, more than 1 row  |
//! | `price_ma_5`       | `price`                                   |
//! | `price_ma_20`      | `price`                                   |
//! | `price_volatility` | `price`                                   |
//! | `year`, `month`, `quarter` | `date`                            |
//!
//! Windows run over table order, across symbol boundaries. Rows from
//! different symbols that are adjacent in the table share a window.

use chrono::Datelike;
use polars::prelude::*;
use tracing::info;

use crate::data::table::{date_values, numeric_values};
use crate::data::DataError;
use crate::stats::{pct_change, rolling_mean, rolling_std, safe_div};

pub const MA_SHORT_WINDOW: usize = 5;
pub const MA_LONG_WINDOW: usize = 20;
pub const VOLATILITY_WINDOW: usize = 10;

/// Derived features, row-aligned with the table they came from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureSet {
    rows: usize,
    pub profit_margin: Option<Vec<Option<f64>>>,
    pub revenue_growth: Option<Vec<Option<f64>>>,
    pub price_ma_5: Option<Vec<Option<f64>>>,
    pub price_ma_20: Option<Vec<Option<f64>>>,
    pub price_volatility: Option<Vec<Option<f64>>>,
    pub year: Option<Vec<Option<i32>>>,
    pub month: Option<Vec<Option<i32>>>,
    pub quarter: Option<Vec<Option<i32>>>,
}

impl FeatureSet {
    /// Number of rows in the source table.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Names of the features that were derived, in output order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.float_columns()
            .into_iter()
            .map(|(name, _)| name)
            .chain(self.int_columns().into_iter().map(|(name, _)| name))
            .collect()
    }

    pub fn column_count(&self) -> usize {
        self.column_names().len()
    }

    /// True when no feature's preconditions held.
    pub fn is_empty(&self) -> bool {
        self.column_count() == 0
    }

    /// Feature table with only the derived columns.
    pub fn to_frame(&self) -> Result<DataFrame, DataError> {
        let mut columns: Vec<Column> = Vec::new();
        for (name, values) in self.float_columns() {
            columns.push(Column::new(name.into(), values.as_slice()));
        }
        for (name, values) in self.int_columns() {
            columns.push(Column::new(name.into(), values.as_slice()));
        }
        Ok(DataFrame::new(columns)?)
    }

    fn float_columns(&self) -> Vec<(&'static str, &Vec<Option<f64>>)> {
        [
            ("profit_margin", &self.profit_margin),
            ("revenue_growth", &self.revenue_growth),
            ("price_ma_5", &self.price_ma_5),
            ("price_ma_20", &self.price_ma_20),
            ("price_volatility", &self.price_volatility),
        ]
        .into_iter()
        .filter_map(|(name, col)| col.as_ref().map(|v| (name, v)))
        .collect()
    }

    fn int_columns(&self) -> Vec<(&'static str, &Vec<Option<i32>>)> {
        [
            ("year", &self.year),
            ("month", &self.month),
            ("quarter", &self.quarter),
        ]
        .into_iter()
        .filter_map(|(name, col)| col.as_ref().map(|v| (name, v)))
        .collect()
    }
}

/// Derive features from a cleaned table. `Ok(None)` for a missing or empty table.
pub fn extract_features(df: Option<&DataFrame>) -> Result<Option<FeatureSet>, DataError> {
    let Some(df) = df else {
        return Ok(None);
    };
    if df.height() == 0 {
        return Ok(None);
    }

    info!(rows = df.height(), "extracting features");

    let mut features = FeatureSet {
        rows: df.height(),
        ..FeatureSet::default()
    };

    if let (Some(revenue), Some(net_profit)) =
        (numeric_values(df, "revenue")?, numeric_values(df, "net_profit")?)
    {
        features.profit_margin = Some(
            net_profit
                .iter()
                .zip(&revenue)
                .map(|(p, r)| safe_div(*p, *r))
                .collect(),
        );
        if df.height() > 1 {
            features.revenue_growth = Some(pct_change(&revenue));
        }
    }

    if let Some(price) = numeric_values(df, "price")? {
        features.price_ma_5 = Some(rolling_mean(&price, MA_SHORT_WINDOW));
        features.price_ma_20 = Some(rolling_mean(&price, MA_LONG_WINDOW));
        features.price_volatility = Some(rolling_std(&price, VOLATILITY_WINDOW));
    }

    if let Some(dates) = date_values(df, "date")? {
        features.year = Some(dates.iter().map(|d| d.map(|d| d.year())).collect());
        features.month = Some(dates.iter().map(|d| d.map(|d| d.month() as i32)).collect());
        features.quarter = Some(
            dates
                .iter()
                .map(|d| d.map(|d| ((d.month() - 1) / 3 + 1) as i32))
                .collect(),
        );
    }

    info!(features = features.column_count(), "features extracted");
    Ok(Some(features))
}
