//! Codal CLI: run the analysis pipeline or a single-symbol check.
//!
//! Commands:
//! - `run`: fetch the company list and reports, clean, derive features,
//!   aggregate trends and write the four artifacts
//! - `check`: fetch one symbol's reports and report row/feature counts

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codal_core::data::{CodalProvider, OfflineProvider, RemoteFetcher, ReportProvider};
use codal_runner::{
    run_check, AnalyzerConfig, Pipeline, DEFAULT_CHECK_DAYS_BACK, DEFAULT_CHECK_SYMBOL,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(
    name = "codal",
    version,
    about = "Codal report analyzer: fetch, clean, extract features, aggregate trends"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write artifacts to the output directory.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Provider base URL. Defaults to https://codal.ir.
        #[arg(long)]
        base_url: Option<String>,

        /// Output directory. Defaults to ./output.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Report look-back window in days. Defaults to 30.
        #[arg(long)]
        days_back: Option<u32>,

        /// Number of companies whose reports are fetched. Defaults to 5.
        #[arg(long)]
        max_companies: Option<usize>,

        /// Seed for fallback data, for reproducible offline runs.
        #[arg(long)]
        seed: Option<u64>,

        /// Offline mode: no network access, sample data only.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
    /// Fetch one symbol's reports, clean them and count derived features.
    Check {
        /// Symbol to check.
        #[arg(default_value = DEFAULT_CHECK_SYMBOL)]
        symbol: String,

        /// Report look-back window in days.
        #[arg(long, default_value_t = DEFAULT_CHECK_DAYS_BACK)]
        days_back: u32,

        /// Provider base URL. Defaults to https://codal.ir.
        #[arg(long)]
        base_url: Option<String>,

        /// Offline mode: no network access, sample data only.
        #[arg(long, default_value_t = false)]
        offline: bool,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            base_url,
            output_dir,
            days_back,
            max_companies,
            seed,
            offline,
        } => {
            let mut config = match config {
                Some(path) => AnalyzerConfig::from_file(&path)?,
                None => AnalyzerConfig::default(),
            };
            if let Some(url) = base_url {
                config.source.base_url = url;
            }
            if let Some(dir) = output_dir {
                config.run.output_dir = dir;
            }
            if let Some(days) = days_back {
                config.source.days_back = days;
            }
            if let Some(n) = max_companies {
                config.run.max_companies = n;
            }
            if seed.is_some() {
                config.run.seed = seed;
            }
            config.validate()?;
            run_pipeline(&config, offline)
        }
        Commands::Check {
            symbol,
            days_back,
            base_url,
            offline,
        } => {
            let mut config = AnalyzerConfig::default();
            if let Some(url) = base_url {
                config.source.base_url = url;
            }
            config.validate()?;
            run_check_cmd(&config, &symbol, days_back, offline)
        }
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")
}

fn provider_for(config: &AnalyzerConfig, offline: bool) -> Result<Box<dyn ReportProvider>> {
    if offline {
        info!("offline mode: using sample data");
        return Ok(Box::new(OfflineProvider));
    }
    let provider = CodalProvider::new(&config.source.settings())
        .context("failed to set up the Codal provider")?;
    Ok(Box::new(provider))
}

fn run_pipeline(config: &AnalyzerConfig, offline: bool) -> Result<()> {
    let provider = provider_for(config, offline)?;
    let summary = Pipeline::from_config(provider, config).run();

    println!("Companies:        {}{}", summary.companies, fallback_note(summary.companies_fallback));
    println!(
        "Reports fetched:  {} symbols ({} from sample data)",
        summary.symbols_fetched, summary.fallback_fetches
    );
    println!("Cleaned rows:     {}", summary.cleaned_rows);
    println!("Feature columns:  {}", summary.feature_columns);
    for path in &summary.artifacts {
        println!("  wrote {}", path.display());
    }
    Ok(())
}

fn run_check_cmd(config: &AnalyzerConfig, symbol: &str, days_back: u32, offline: bool) -> Result<()> {
    let fetcher = RemoteFetcher::new(provider_for(config, offline)?, config.run.generator());
    let report = run_check(&fetcher, symbol, days_back)
        .with_context(|| format!("check failed for {symbol}"))?;

    println!("Companies:        {}{}", report.companies, fallback_note(report.companies_fallback));
    println!("Reports:          {}{}", report.reports, fallback_note(report.reports_fallback));
    println!("Cleaned rows:     {}", report.cleaned_rows);
    println!("Feature columns:  {}", report.feature_columns);
    Ok(())
}

fn fallback_note(fallback: bool) -> &'static str {
    if fallback {
        " (sample data)"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_flags_parse() {
        let cli = Cli::try_parse_from([
            "codal",
            "run",
            "--base-url",
            "http://localhost:9000",
            "--days-back",
            "7",
            "--max-companies",
            "2",
            "--seed",
            "42",
            "--offline",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                base_url,
                days_back,
                max_companies,
                seed,
                offline,
                config,
                output_dir,
            } => {
                assert_eq!(base_url.as_deref(), Some("http://localhost:9000"));
                assert_eq!(days_back, Some(7));
                assert_eq!(max_companies, Some(2));
                assert_eq!(seed, Some(42));
                assert!(offline);
                assert!(config.is_none());
                assert!(output_dir.is_none());
            }
            Commands::Check { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn check_defaults() {
        let cli = Cli::try_parse_from(["codal", "check"]).unwrap();
        match cli.command {
            Commands::Check {
                symbol,
                days_back,
                base_url,
                offline,
            } => {
                assert_eq!(symbol, "Foolad");
                assert_eq!(days_back, 7);
                assert!(base_url.is_none());
                assert!(!offline);
            }
            Commands::Run { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn offline_provider_needs_no_network() {
        let config = AnalyzerConfig::default();
        let provider = provider_for(&config, true).unwrap();
        assert_eq!(provider.name(), "offline");
    }
}
