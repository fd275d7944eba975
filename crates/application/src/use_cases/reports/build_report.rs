use crate::use_cases::lookups::BatchOutcome;
use dns_reputation_domain::{
    BatchReport, CaptureStats, Classification, LookupResult, LookupStats, ResponseTimeStats,
};
use std::collections::BTreeMap;
use std::time::Duration;

/// Folds a batch outcome into the summary handed to report writers.
///
/// Cached results count toward totals and classification but not toward
/// latency: a cache hit costs no remote call.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildReportUseCase;

impl BuildReportUseCase {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(
        &self,
        outcome: &BatchOutcome,
        capture: Option<CaptureStats>,
        lookups: Option<LookupStats>,
    ) -> BatchReport {
        let mut successful = 0;
        let mut trusted = 0;
        let mut untrusted = 0;
        let mut failures_by_kind: BTreeMap<String, usize> = BTreeMap::new();
        let mut latencies: Vec<Duration> = Vec::new();

        for result in &outcome.results {
            match result {
                LookupResult::Success(s) => {
                    successful += 1;
                    match s.classification {
                        Classification::Trusted => trusted += 1,
                        Classification::Untrusted => untrusted += 1,
                    }
                    if !s.cached {
                        latencies.push(s.response_time);
                    }
                }
                LookupResult::Failure(f) => {
                    *failures_by_kind.entry(f.kind.as_str().to_string()).or_default() += 1;
                }
            }
        }

        let unique = outcome.results.len();
        let elapsed_secs = outcome.elapsed.as_secs_f64();

        BatchReport {
            total_requests: outcome.requested,
            unique_domains: unique,
            invalid_inputs: outcome.invalid_inputs,
            successful,
            failed: unique - successful,
            trusted,
            untrusted,
            cache_hits: outcome.cache_hits,
            cache_hit_rate: ratio(outcome.cache_hits, unique),
            elapsed_secs,
            throughput_per_sec: if elapsed_secs > 0.0 {
                unique as f64 / elapsed_secs
            } else {
                0.0
            },
            response_time: response_time_stats(latencies),
            failures_by_kind,
            cancelled: outcome.cancelled,
            timed_out: outcome.timed_out,
            capture,
            lookups,
        }
    }
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

fn response_time_stats(mut samples: Vec<Duration>) -> Option<ResponseTimeStats> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_unstable();

    let ms = |d: Duration| d.as_secs_f64() * 1000.0;
    let n = samples.len();
    let total: f64 = samples.iter().copied().map(ms).sum();
    let median = if n % 2 == 0 {
        (ms(samples[n / 2 - 1]) + ms(samples[n / 2])) / 2.0
    } else {
        ms(samples[n / 2])
    };

    Some(ResponseTimeStats {
        samples: n,
        avg_ms: total / n as f64,
        min_ms: ms(samples[0]),
        median_ms: median,
        max_ms: ms(samples[n - 1]),
    })
}
