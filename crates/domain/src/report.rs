use serde::Serialize;
use std::collections::BTreeMap;

/// Counters collected while extracting domains from a capture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CaptureStats {
    pub packets: u64,
    pub dns_messages: u64,
    pub domains: u64,
    pub errors: u64,
    /// Extraction stopped early on cancellation.
    pub interrupted: bool,
}

/// Counters kept by the lookup client across every batch it served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    pub remote_calls: u64,
    pub throttled_responses: u64,
    pub retries: u64,
}

/// Latency summary over non-cached successful lookups, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseTimeStats {
    pub samples: usize,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub median_ms: f64,
    pub max_ms: f64,
}

/// Aggregated statistics of one batch run, handed to report writers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    /// Inputs submitted to the engine, duplicates included.
    pub total_requests: usize,
    pub unique_domains: usize,
    pub invalid_inputs: usize,
    pub successful: usize,
    pub failed: usize,
    pub trusted: usize,
    pub untrusted: usize,
    pub cache_hits: usize,
    /// `cache_hits / unique_domains`, 0.0 for an empty batch.
    pub cache_hit_rate: f64,
    pub elapsed_secs: f64,
    pub throughput_per_sec: f64,
    pub response_time: Option<ResponseTimeStats>,
    pub failures_by_kind: BTreeMap<String, usize>,
    pub cancelled: bool,
    pub timed_out: bool,
    pub capture: Option<CaptureStats>,
    pub lookups: Option<LookupStats>,
}

impl BatchReport {
    pub fn success_rate(&self) -> f64 {
        if self.unique_domains == 0 {
            return 0.0;
        }
        self.successful as f64 / self.unique_domains as f64
    }
}
