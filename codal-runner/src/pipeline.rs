//! Batch driver: fetch, clean, extract, aggregate, persist.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use codal_core::analysis::{analyze_trends, extract_features};
use codal_core::data::{clean, records_to_frame, RemoteFetcher, ReportProvider};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AnalyzerConfig;
use crate::writer::{
    Artifact, ResultWriter, CLEANED_ARTIFACT, COMPANIES_ARTIFACT, FEATURES_ARTIFACT,
    TRENDS_ARTIFACT,
};

/// Pause between successive per-symbol report fetches.
pub const FETCH_THROTTLE: Duration = Duration::from_secs(1);

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub companies: usize,
    pub companies_fallback: bool,
    pub symbols_fetched: usize,
    pub fallback_fetches: usize,
    pub raw_rows: usize,
    pub cleaned_rows: usize,
    pub feature_columns: usize,
    pub artifacts: Vec<PathBuf>,
}

pub struct Pipeline<P> {
    fetcher: RemoteFetcher<P>,
    writer: ResultWriter,
    max_companies: usize,
    days_back: u32,
    throttle: Duration,
}

impl<P: ReportProvider> Pipeline<P> {
    pub fn new(
        fetcher: RemoteFetcher<P>,
        writer: ResultWriter,
        max_companies: usize,
        days_back: u32,
    ) -> Self {
        Self {
            fetcher,
            writer,
            max_companies,
            days_back,
            throttle: FETCH_THROTTLE,
        }
    }

    pub fn from_config(provider: P, config: &AnalyzerConfig) -> Self {
        Self::new(
            RemoteFetcher::new(provider, config.run.generator()),
            ResultWriter::new(&config.run.output_dir),
            config.run.max_companies,
            config.source.days_back,
        )
    }

    /// Override the pause between report fetches.
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn writer(&self) -> &ResultWriter {
        &self.writer
    }

    /// Run every stage once. Stage failures are logged and skip that stage's
    /// artifact; the run itself always completes.
    pub fn run(&self) -> RunSummary {
        info!(output = %self.writer.output_dir().display(), "starting Codal data analysis");
        let mut summary = RunSummary::default();

        let companies = self.fetcher.fetch_company_list();
        summary.companies_fallback = companies.is_fallback();
        let companies = companies.into_data();
        summary.companies = companies.len();
        self.save(&Artifact::Companies(&companies), COMPANIES_ARTIFACT, &mut summary);

        let mut records = Vec::new();
        for (i, company) in companies.iter().take(self.max_companies).enumerate() {
            if i > 0 && !self.throttle.is_zero() {
                thread::sleep(self.throttle);
            }
            let outcome = self.fetcher.fetch_reports(&company.symbol, self.days_back);
            summary.symbols_fetched += 1;
            if outcome.is_fallback() {
                summary.fallback_fetches += 1;
            }
            records.extend(outcome.into_data());
        }
        summary.raw_rows = records.len();

        let cleaned = match records_to_frame(&records).and_then(|df| clean(Some(&df))) {
            Ok(Some(df)) => df,
            Ok(None) => {
                warn!("no report rows to analyze");
                return summary;
            }
            Err(e) => {
                warn!(error = %e, "cleaning failed, skipping analysis");
                return summary;
            }
        };
        summary.cleaned_rows = cleaned.height();
        self.save(&Artifact::Table(&cleaned), CLEANED_ARTIFACT, &mut summary);

        match extract_features(Some(&cleaned)).and_then(|f| match f {
            Some(f) if !f.is_empty() => f.to_frame().map(|df| Some((f.column_count(), df))),
            _ => Ok(None),
        }) {
            Ok(Some((count, features))) => {
                summary.feature_columns = count;
                self.save(&Artifact::Table(&features), FEATURES_ARTIFACT, &mut summary);
            }
            Ok(None) => warn!("no features could be derived"),
            Err(e) => warn!(error = %e, "feature extraction failed"),
        }

        match analyze_trends(Some(&cleaned)) {
            Ok(Some(trends)) if !trends.is_empty() => {
                self.save(&Artifact::Summary(&trends), TRENDS_ARTIFACT, &mut summary);
            }
            Ok(_) => warn!("no trends could be computed"),
            Err(e) => warn!(error = %e, "trend analysis failed"),
        }

        info!(
            companies = summary.companies,
            fallbacks = summary.fallback_fetches,
            rows = summary.cleaned_rows,
            artifacts = summary.artifacts.len(),
            "analysis completed"
        );
        summary
    }

    fn save(&self, artifact: &Artifact<'_>, name: &str, summary: &mut RunSummary) {
        if let Some(path) = self.writer.persist(artifact, name) {
            summary.artifacts.push(path);
        }
    }
}
