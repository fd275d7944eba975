//! # DNS Reputation Analyzer
//!
//! Extracts the domains queried in a capture (or listed in a text file),
//! looks up each one against a remote reputation service under a global
//! rate limit and writes CSV/JSON reports.

mod bootstrap;
mod di;

use bootstrap::signals::INTERRUPTED_EXIT_CODE;
use clap::Parser;
use di::AnalysisServices;
use dns_reputation_application::use_cases::{BatchProgress, ProgressCallback};
use dns_reputation_domain::config::InputFormat;
use dns_reputation_domain::{BatchReport, CliOverrides};
use dns_reputation_infrastructure::capture::open_source;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

const PROGRESS_EVERY: usize = 20;

#[derive(Parser)]
#[command(name = "dns-reputation")]
#[command(version)]
#[command(about = "Reputation analysis of the domains seen in DNS traffic")]
struct Cli {
    /// Path to configuration file
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Capture (.pcap) or domain list to analyze
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Input format: auto, pcap or text
    #[arg(long)]
    format: Option<InputFormat>,

    /// Directory receiving the reports
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Reputation service URL prefix
    #[arg(long)]
    base_url: Option<String>,

    /// Global request rate towards the service
    #[arg(long)]
    rps: Option<f64>,

    /// Total attempts per domain
    #[arg(long)]
    max_retries: Option<u32>,

    /// Timeout of a single attempt, in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Lookups in flight at once (defaults to engine.max_concurrency, 50)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long)]
    log_level: Option<String>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            input: self.input.clone(),
            format: self.format,
            output_dir: self.output_dir.clone(),
            base_url: self.base_url.clone(),
            requests_per_second: self.rps,
            max_retries: self.max_retries,
            attempt_timeout_ms: self.timeout_ms,
            max_concurrency: self.concurrency,
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config.logging);
    bootstrap::config::log_config(cli.config.as_deref(), &config);

    let cancel = CancellationToken::new();
    bootstrap::install_interrupt_handler(cancel.clone());

    let input = config
        .input
        .path
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no input file given"))?;
    let source = open_source(&input, config.input.format)?;
    let services = AnalysisServices::new(&config, &source.describe())?;

    info!(source = %source.describe(), "Extracting domains");
    let extraction = {
        let source = Arc::clone(&source);
        let cancel = cancel.clone();
        tokio::task::spawn_blocking(move || source.extract(&cancel)).await??
    };

    if extraction.stats.interrupted {
        warn!(
            domains = extraction.domains.len(),
            "Interrupted during extraction, nothing was looked up"
        );
        return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
    }

    let progress: ProgressCallback = Arc::new(|p: BatchProgress| {
        if p.completed % PROGRESS_EVERY == 0 || p.completed == p.total {
            info!(completed = p.completed, total = p.total, "Lookup progress");
        }
    });

    let outcome = services
        .batch
        .execute(extraction.domains, Some(progress), &cancel)
        .await
        .sorted();

    let report = services.build_report.execute(
        &outcome,
        Some(extraction.stats),
        Some(services.client.stats()),
    );
    let expected = services.publish_report.writer_count();
    let written = {
        let publish = Arc::clone(&services.publish_report);
        let results = outcome.results;
        let report = report.clone();
        tokio::task::spawn_blocking(move || publish.execute(&results, &report)).await?
    };
    if written.len() < expected {
        error!(
            written = written.len(),
            expected,
            "Some reports could not be written"
        );
    }

    log_summary(&report);
    let cache = services.cache.stats();
    info!(
        entries = cache.entries,
        hits = cache.hits,
        misses = cache.misses,
        "Cache statistics"
    );

    if report.cancelled {
        warn!("Run cancelled, reports contain partial results");
        return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

fn log_summary(report: &BatchReport) {
    info!(
        total_requests = report.total_requests,
        unique_domains = report.unique_domains,
        invalid_inputs = report.invalid_inputs,
        successful = report.successful,
        failed = report.failed,
        trusted = report.trusted,
        untrusted = report.untrusted,
        "Analysis summary"
    );
    info!(
        cache_hits = report.cache_hits,
        cache_hit_rate = %format!("{:.1}%", report.cache_hit_rate * 100.0),
        elapsed_secs = %format!("{:.2}", report.elapsed_secs),
        throughput_per_sec = %format!("{:.2}", report.throughput_per_sec),
        timed_out = report.timed_out,
        "Run statistics"
    );

    if let Some(rt) = &report.response_time {
        info!(
            samples = rt.samples,
            avg_ms = %format!("{:.1}", rt.avg_ms),
            min_ms = %format!("{:.1}", rt.min_ms),
            median_ms = %format!("{:.1}", rt.median_ms),
            max_ms = %format!("{:.1}", rt.max_ms),
            "Response times"
        );
    }

    for (kind, count) in &report.failures_by_kind {
        warn!(kind = %kind, count, "Failed lookups");
    }
}
