//! Derived features and trend summaries over a cleaned report table.

pub mod features;
pub mod trends;

pub use features::{extract_features, FeatureSet};
pub use trends::{analyze_trends, PriceStats, SymbolTrend, TrendSummary, VolumeStats, YearMonth};
