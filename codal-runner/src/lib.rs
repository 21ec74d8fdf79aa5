//! Codal Runner: configuration, artifact writing and the batch pipeline.
//!
//! This crate builds on `codal-core` to provide:
//! - TOML configuration with defaults for every field
//! - The result writer (CSV tables, pretty JSON summaries)
//! - The pipeline driver that runs fetch → clean → features → trends → persist
//! - A single-symbol smoke check

pub mod check;
pub mod config;
pub mod pipeline;
pub mod writer;

pub use check::{run_check, CheckReport, DEFAULT_CHECK_DAYS_BACK, DEFAULT_CHECK_SYMBOL};
pub use config::{AnalyzerConfig, ConfigError, RunConfig, SourceConfig};
pub use pipeline::{Pipeline, RunSummary, FETCH_THROTTLE};
pub use writer::{Artifact, ResultWriter};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<AnalyzerConfig>();
        assert_sync::<AnalyzerConfig>();
        assert_send::<ConfigError>();
        assert_sync::<ConfigError>();
    }

    #[test]
    fn reports_are_send_sync() {
        assert_send::<RunSummary>();
        assert_sync::<RunSummary>();
        assert_send::<CheckReport>();
        assert_sync::<CheckReport>();
    }
}
