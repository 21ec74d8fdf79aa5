//! Fetch-with-fallback.
//!
//! Every request goes to the provider exactly once. A success payload is
//! returned as `FetchOutcome::Fetched`; any provider error (non-200 status,
//! timeout, DNS or connection failure, malformed body) is absorbed and
//! replaced with synthetic data of the same request shape, tagged
//! `FetchOutcome::Fallback`. Nothing is retried and nothing is raised.

use tracing::{info, warn};

use super::provider::{FetchOutcome, ReportProvider};
use super::records::{CompanyRecord, RawRecord};
use super::synthetic::SyntheticGenerator;

/// Default report look-back window in days.
pub const DEFAULT_DAYS_BACK: u32 = 30;

/// Owns the provider (and through it the HTTP session) for one run.
pub struct RemoteFetcher<P> {
    provider: P,
    generator: SyntheticGenerator,
}

impl<P: ReportProvider> RemoteFetcher<P> {
    pub fn new(provider: P, generator: SyntheticGenerator) -> Self {
        Self {
            provider,
            generator,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn generator(&self) -> &SyntheticGenerator {
        &self.generator
    }

    /// Fetch the company list, falling back to the fixed sample set.
    pub fn fetch_company_list(&self) -> FetchOutcome<Vec<CompanyRecord>> {
        info!(provider = self.provider.name(), "retrieving company list");

        match self.provider.fetch_companies() {
            Ok(companies) => {
                info!(count = companies.len(), "found companies");
                FetchOutcome::Fetched(companies)
            }
            Err(e) => {
                warn!(error = %e, "company list unavailable, using sample data");
                FetchOutcome::Fallback {
                    data: self.generator.generate_companies(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fetch one symbol's reports, falling back to synthetic weekly reports.
    pub fn fetch_reports(&self, symbol: &str, days_back: u32) -> FetchOutcome<Vec<RawRecord>> {
        info!(provider = self.provider.name(), symbol, days_back, "retrieving reports");

        match self.provider.fetch_reports(symbol, days_back) {
            Ok(reports) => {
                info!(symbol, count = reports.len(), "found reports");
                FetchOutcome::Fetched(reports)
            }
            Err(e) => {
                warn!(symbol, error = %e, "reports unavailable, using sample data");
                let data = self
                    .generator
                    .reports_for(symbol)
                    .iter()
                    .map(|r| r.to_raw())
                    .collect();
                FetchOutcome::Fallback {
                    data,
                    reason: e.to_string(),
                }
            }
        }
    }
}
