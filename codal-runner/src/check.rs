//! Single-symbol smoke check: company list, one symbol's reports, clean,
//! extract features. Nothing is written to disk.

use codal_core::analysis::extract_features;
use codal_core::data::{clean, records_to_frame, DataError, RemoteFetcher, ReportProvider};
use serde::Serialize;
use tracing::info;

/// Symbol checked when none is given.
pub const DEFAULT_CHECK_SYMBOL: &str = "Foolad";
/// Look-back window used by the check.
pub const DEFAULT_CHECK_DAYS_BACK: u32 = 7;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckReport {
    pub symbol: String,
    pub companies: usize,
    pub companies_fallback: bool,
    pub reports: usize,
    pub reports_fallback: bool,
    pub cleaned_rows: usize,
    pub feature_columns: usize,
}

pub fn run_check<P: ReportProvider>(
    fetcher: &RemoteFetcher<P>,
    symbol: &str,
    days_back: u32,
) -> Result<CheckReport, DataError> {
    let mut report = CheckReport {
        symbol: symbol.to_string(),
        ..CheckReport::default()
    };

    let companies = fetcher.fetch_company_list();
    report.companies_fallback = companies.is_fallback();
    report.companies = companies.data().len();

    let reports = fetcher.fetch_reports(symbol, days_back);
    report.reports_fallback = reports.is_fallback();
    report.reports = reports.data().len();

    let table = records_to_frame(reports.data())?;
    if let Some(cleaned) = clean(Some(&table))? {
        report.cleaned_rows = cleaned.height();
        if let Some(features) = extract_features(Some(&cleaned))? {
            report.feature_columns = features.column_count();
        }
    }

    info!(
        symbol,
        companies = report.companies,
        reports = report.reports,
        rows = report.cleaned_rows,
        features = report.feature_columns,
        "check completed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codal_core::data::{OfflineProvider, SyntheticGenerator};

    #[test]
    fn offline_check_uses_sample_data() {
        let fetcher = RemoteFetcher::new(OfflineProvider, SyntheticGenerator::new(Some(1)));
        let report = run_check(&fetcher, DEFAULT_CHECK_SYMBOL, DEFAULT_CHECK_DAYS_BACK).unwrap();

        assert_eq!(report.symbol, "Foolad");
        assert!(report.companies_fallback);
        assert!(report.reports_fallback);
        assert_eq!(report.companies, 5);
        assert_eq!(report.reports, 5);
        assert_eq!(report.cleaned_rows, 5);
        // margin, growth, three price windows, year, month, quarter
        assert_eq!(report.feature_columns, 8);
    }
}
