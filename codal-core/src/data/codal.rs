//! Codal HTTP provider.
//!
//! Talks to the Codal-style JSON API:
//! - `GET {base}/api/v1/companies`
//! - `GET {base}/api/v1/companies/{symbol}/reports?days_back={n}&page_size={m}`
//!
//! One blocking client is built per provider and reused for every request of
//! the run. There is no retry: any failure is returned to the fetcher, which
//! substitutes synthetic data.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::warn;

use super::provider::{DataError, ReportProvider};
use super::records::{CompanyRecord, RawRecord};

pub const DEFAULT_BASE_URL: &str = "https://codal.ir";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Connection settings for the HTTP provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    pub page_size: u32,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Codal API provider backed by a reusable blocking HTTP client.
pub struct CodalProvider {
    client: Client,
    base: Url,
    page_size: u32,
}

impl CodalProvider {
    pub fn new(settings: &SourceSettings) -> Result<Self, DataError> {
        let base = Url::parse(&settings.base_url)
            .map_err(|e| DataError::InvalidUrl(format!("{}: {e}", settings.base_url)))?;
        if base.cannot_be_a_base() {
            return Err(DataError::InvalidUrl(settings.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base,
            page_size: settings.page_size,
        })
    }

    /// Append path segments to the base URL. Segments are percent-encoded,
    /// so non-ASCII symbols are safe.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DataError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| DataError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn companies_url(&self) -> Result<Url, DataError> {
        self.endpoint(&["api", "v1", "companies"])
    }

    fn reports_url(&self, symbol: &str) -> Result<Url, DataError> {
        self.endpoint(&["api", "v1", "companies", symbol, "reports"])
    }

    /// Issue one GET and decode a JSON body. Only status 200 counts as success.
    fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, DataError> {
        let resp = self
            .client
            .get(url.clone())
            .query(query)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        resp.json::<T>().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response from {url}: {e}"))
        })
    }
}

impl ReportProvider for CodalProvider {
    fn name(&self) -> &str {
        "codal"
    }

    /// Entries are adapted leniently; only objects without a usable symbol
    /// are dropped.
    fn fetch_companies(&self) -> Result<Vec<CompanyRecord>, DataError> {
        let url = self.companies_url()?;
        let raw: Vec<RawRecord> = self.get_json(url, &[])?;
        let companies: Vec<CompanyRecord> =
            raw.iter().filter_map(CompanyRecord::from_raw).collect();
        if companies.len() < raw.len() {
            warn!(skipped = raw.len() - companies.len(), "company entries without a symbol");
        }
        Ok(companies)
    }

    fn fetch_reports(&self, symbol: &str, days_back: u32) -> Result<Vec<RawRecord>, DataError> {
        let url = self.reports_url(symbol)?;
        let query = [
            ("days_back", days_back.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        self.get_json(url, &query)
    }
}
