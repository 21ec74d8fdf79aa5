//! Codal Core: report records, fetch-with-fallback, cleaning, features, trends.
//!
//! This crate holds the data pipeline:
//! - Company and report records, and the table builder that turns raw
//!   provider records into a `polars::DataFrame`
//! - The provider trait, the Codal HTTP provider and the fetch-with-fallback
//!   wrapper that substitutes synthetic data on any failure
//! - The cleaner (dedupe, date/numeric coercion, key filtering)
//! - Trailing-window statistics and the feature extractor
//! - The trend aggregator (per-symbol and per-month summaries)

pub mod analysis;
pub mod data;
pub mod stats;
