//! Synthetic placeholder data used when the provider is unavailable.
//!
//! Values are drawn uniformly from fixed ranges and are never validated
//! against real data. With a master seed, each symbol's draws come from a
//! sub-seed derived by hashing `(seed, symbol)` with BLAKE3, so the output
//! for a symbol does not depend on the order symbols are requested in.

use chrono::{Duration, Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::records::{CompanyRecord, ReportRecord, ReportType};

/// Number of synthetic reports generated per symbol unless configured otherwise.
pub const DEFAULT_REPORT_COUNT: usize = 5;

const REVENUE_RANGE: (i64, i64) = (1_000_000, 10_000_000);
const NET_PROFIT_RANGE: (i64, i64) = (100_000, 1_000_000);
const PRICE_RANGE: (i64, i64) = (1_000, 10_000);
const VOLUME_RANGE: (i64, i64) = (100_000, 1_000_000);

/// Days between consecutive synthetic reports, going backward from today.
const REPORT_SPACING_DAYS: i64 = 7;

/// Generator for fallback companies and reports.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    seed: Option<u64>,
    report_count: usize,
}

impl SyntheticGenerator {
    /// `None` draws from OS entropy; `Some(seed)` makes output reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            report_count: DEFAULT_REPORT_COUNT,
        }
    }

    pub fn with_report_count(mut self, report_count: usize) -> Self {
        self.report_count = report_count;
        self
    }

    pub fn report_count(&self) -> usize {
        self.report_count
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// The fixed sample of five listed companies, one per sector.
    pub fn generate_companies(&self) -> Vec<CompanyRecord> {
        vec![
            CompanyRecord::new("فولاد", "فولاد مبارکه اصفهان", "فلزات اساسی"),
            CompanyRecord::new("پتروشیمی", "پتروشیمی پارس", "پتروشیمی"),
            CompanyRecord::new("بانک", "بانک ملی ایران", "بانک‌ها"),
            CompanyRecord::new("خودرو", "ایران خودرو", "خودرو"),
            CompanyRecord::new("سیمان", "سیمان تهران", "سیمان"),
        ]
    }

    /// `report_count()` weekly reports for `symbol`, newest (today) first.
    pub fn reports_for(&self, symbol: &str) -> Vec<ReportRecord> {
        self.generate_reports(symbol, self.report_count)
    }

    /// `count` weekly reports for `symbol`, newest (today) first.
    pub fn generate_reports(&self, symbol: &str, count: usize) -> Vec<ReportRecord> {
        self.generate_reports_as_of(symbol, count, Local::now().date_naive())
    }

    /// Like `generate_reports`, with an explicit reference date.
    pub fn generate_reports_as_of(
        &self,
        symbol: &str,
        count: usize,
        today: NaiveDate,
    ) -> Vec<ReportRecord> {
        let mut rng = self.rng_for(symbol);

        (0..count)
            .map(|i| ReportRecord {
                symbol: symbol.to_string(),
                date: Some(today - Duration::days(REPORT_SPACING_DAYS * i as i64)),
                revenue: Some(draw(&mut rng, REVENUE_RANGE)),
                net_profit: Some(draw(&mut rng, NET_PROFIT_RANGE)),
                price: Some(draw(&mut rng, PRICE_RANGE)),
                volume: Some(draw(&mut rng, VOLUME_RANGE)),
                report_type: ReportType::for_index(i),
            })
            .collect()
    }

    fn rng_for(&self, symbol: &str) -> StdRng {
        match self.seed {
            Some(seed) => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(&seed.to_le_bytes());
                hasher.update(symbol.as_bytes());
                StdRng::from_seed(*hasher.finalize().as_bytes())
            }
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self::new(None)
    }
}

fn draw(rng: &mut StdRng, (lo, hi): (i64, i64)) -> i64 {
    rng.gen_range(lo..=hi)
}
