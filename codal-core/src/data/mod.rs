//! Data acquisition, table construction and cleaning.

pub mod clean;
pub mod codal;
pub mod fetcher;
pub mod provider;
pub mod records;
pub mod synthetic;
pub mod table;

pub use clean::{clean, DATE_COLUMNS};
pub use codal::{CodalProvider, SourceSettings};
pub use fetcher::{RemoteFetcher, DEFAULT_DAYS_BACK};
pub use provider::{DataError, FetchOutcome, OfflineProvider, ReportProvider};
pub use records::{CompanyRecord, RawRecord, ReportRecord, ReportType};
pub use synthetic::{SyntheticGenerator, DEFAULT_REPORT_COUNT};
pub use table::{companies_to_frame, records_to_frame};
