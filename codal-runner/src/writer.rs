//! Artifact persistence: tables as CSV, trend summaries as pretty JSON.
//!
//! Failures never propagate. They are logged at `error` level and `persist`
//! returns `None`, so one unwritable artifact does not stop the run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use codal_core::analysis::TrendSummary;
use codal_core::data::{companies_to_frame, CompanyRecord};
use polars::prelude::{DataFrame, DataType};
use tracing::{error, info};

pub const COMPANIES_ARTIFACT: &str = "companies_list";
pub const CLEANED_ARTIFACT: &str = "cleaned_financial_data";
pub const FEATURES_ARTIFACT: &str = "financial_features";
pub const TRENDS_ARTIFACT: &str = "market_trends";

/// Something that can be written to the output directory.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    Table(&'a DataFrame),
    Summary(&'a TrendSummary),
    Companies(&'a [CompanyRecord]),
}

impl Artifact<'_> {
    fn extension(&self) -> &'static str {
        match self {
            Artifact::Table(_) | Artifact::Companies(_) => "csv",
            Artifact::Summary(_) => "json",
        }
    }
}

/// Writes artifacts under one output directory, created on first write.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path an artifact named `name` would be written to.
    pub fn path_for(&self, artifact: &Artifact<'_>, name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{name}.{}", artifact.extension()))
    }

    /// Write `artifact` as `<dir>/<name>.csv` or `<dir>/<name>.json`.
    pub fn persist(&self, artifact: &Artifact<'_>, name: &str) -> Option<PathBuf> {
        let path = self.path_for(artifact, name);
        let result = fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("failed to create {}", self.output_dir.display()))
            .and_then(|_| match artifact {
                Artifact::Table(df) => write_csv(df, &path),
                Artifact::Companies(companies) => companies_to_frame(companies)
                    .context("failed to tabulate company list")
                    .and_then(|df| write_csv(&df, &path)),
                Artifact::Summary(summary) => write_json(summary, &path),
            });

        match result {
            Ok(()) => {
                info!(path = %path.display(), "results saved");
                Some(path)
            }
            Err(e) => {
                error!(artifact = name, error = %format!("{e:#}"), "failed to save results");
                None
            }
        }
    }
}

/// Header row of column names, then one record per row. Every column is cast
/// to text first, so nulls become empty fields and dates render `YYYY-MM-DD`.
fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let mut columns = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let text = column
            .cast(&DataType::String)
            .with_context(|| format!("failed to render column {}", column.name()))?;
        columns.push(text);
    }
    let columns = columns
        .iter()
        .map(|c| c.str())
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("column did not render as text")?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(df.get_column_names().iter().map(|n| n.as_str()))?;
    for row in 0..df.height() {
        writer.write_record(columns.iter().map(|c| c.get(row).unwrap_or("")))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn write_json(summary: &TrendSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to serialize summary")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
