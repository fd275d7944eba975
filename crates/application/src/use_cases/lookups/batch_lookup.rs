use crate::services::{LookupClient, ReputationCache};
use dns_reputation_domain::config::EngineConfig;
use dns_reputation_domain::{AttemptError, Domain, LookupErrorKind, LookupFailure, LookupResult};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// How long in-flight lookups get to wind down once a run is cancelled.
const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// Running count handed to the progress callback after each resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

pub type ProgressCallback = Arc<dyn Fn(BatchProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Lookups in flight at once; unbounded when `None`.
    pub max_concurrency: Option<usize>,
    /// Store failed outcomes in the cache as well as successes.
    pub cache_failures: bool,
    /// Abort the run once this much time has passed.
    pub batch_timeout: Option<Duration>,
}

impl BatchOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            max_concurrency: config.max_concurrency.filter(|n| *n > 0),
            cache_failures: config.cache_failures,
            batch_timeout: config.batch_timeout(),
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Everything one run produced. Owned by the caller; nothing is shared
/// between runs except the cache and the lookup client.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    /// One terminal result per unique valid domain, in completion order.
    pub results: Vec<LookupResult>,
    /// Inputs received, duplicates and invalid names included.
    pub requested: usize,
    pub unique: usize,
    pub invalid_inputs: usize,
    pub cache_hits: usize,
    pub cancelled: bool,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl BatchOutcome {
    /// Reorder results by domain name.
    pub fn sorted(mut self) -> Self {
        self.results.sort_by(|a, b| a.domain().cmp(b.domain()));
        self
    }
}

/// Resolves the reputation of a set of domains concurrently.
///
/// Cache hits are answered inline without touching the rate limiter. Every
/// miss becomes one task on a [`JoinSet`] that calls the [`LookupClient`]
/// and writes the outcome back to the cache. Per-domain errors never abort
/// the run; each unique domain gets exactly one result.
pub struct BatchLookupUseCase {
    client: Arc<LookupClient>,
    cache: Arc<ReputationCache>,
    options: BatchOptions,
}

impl BatchLookupUseCase {
    pub fn new(client: Arc<LookupClient>, cache: Arc<ReputationCache>) -> Self {
        Self {
            client,
            cache,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    #[instrument(skip_all)]
    pub async fn execute<I, S>(
        &self,
        domains: I,
        progress: Option<ProgressCallback>,
        cancel: &CancellationToken,
    ) -> BatchOutcome
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        let (order, requested, invalid_inputs) = normalize(domains);
        let total = order.len();

        info!(
            requested,
            unique = total,
            invalid = invalid_inputs,
            max_concurrency = ?self.options.max_concurrency,
            "Starting batch lookup"
        );

        let report = |completed: usize| {
            if let Some(callback) = &progress {
                callback(BatchProgress { completed, total });
            }
        };

        let run = cancel.child_token();
        let semaphore = self
            .options
            .max_concurrency
            .map(|permits| Arc::new(Semaphore::new(permits)));

        let mut results: Vec<LookupResult> = Vec::with_capacity(total);
        let mut resolved: FxHashSet<Domain> = FxHashSet::default();
        let mut cache_hits = 0usize;
        let mut tasks: JoinSet<LookupResult> = JoinSet::new();

        for domain in &order {
            if run.is_cancelled() {
                break;
            }

            if let Some(hit) = self.cache.get(domain) {
                cache_hits += 1;
                resolved.insert(domain.clone());
                results.push(hit.into_cached());
                report(results.len());
                continue;
            }

            tasks.spawn(lookup_task(
                domain.clone(),
                Arc::clone(&self.client),
                Arc::clone(&self.cache),
                semaphore.clone(),
                run.clone(),
                self.options.cache_failures,
            ));
        }

        debug!(spawned = tasks.len(), cache_hits, "Lookup tasks dispatched");

        let deadline = self
            .options
            .batch_timeout
            .and_then(|timeout| started.checked_add(timeout));
        let mut timed_out = false;

        while !tasks.is_empty() {
            tokio::select! {
                biased;
                _ = run.cancelled() => break,
                _ = deadline_reached(deadline) => {
                    warn!(
                        timeout_secs = self.options.batch_timeout.map(|t| t.as_secs_f64()),
                        "Batch timeout elapsed, cancelling remaining lookups"
                    );
                    timed_out = true;
                    run.cancel();
                    break;
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(result)) => {
                        if resolved.insert(result.domain().clone()) {
                            results.push(result);
                            report(results.len());
                        }
                    }
                    Some(Err(e)) => warn!(error = %e, "Lookup task terminated unexpectedly"),
                    None => break,
                },
            }
        }

        if !tasks.is_empty() {
            // Lookups observe the run token and return Cancelled promptly;
            // give them a bounded window before aborting what is left.
            let drained = tokio::time::timeout(CANCEL_GRACE, async {
                while let Some(joined) = tasks.join_next().await {
                    match joined {
                        Ok(result) => {
                            if resolved.insert(result.domain().clone()) {
                                results.push(result);
                                report(results.len());
                            }
                        }
                        Err(e) => warn!(error = %e, "Lookup task terminated unexpectedly"),
                    }
                }
            })
            .await;
            if drained.is_err() {
                warn!(remaining = tasks.len(), "Aborting lookups that ignored cancellation");
                tasks.shutdown().await;
            }
        }

        let cancelled = cancel.is_cancelled();
        for domain in order {
            if resolved.contains(&domain) {
                continue;
            }
            let reason = if timed_out {
                "batch timeout elapsed before the lookup finished"
            } else if cancelled {
                "batch cancelled before the lookup finished"
            } else {
                "lookup task terminated unexpectedly"
            };
            results.push(
                LookupFailure::cancelled(domain)
                    .with_last_error(AttemptError::new(LookupErrorKind::Cancelled, reason))
                    .into(),
            );
            report(results.len());
        }

        let elapsed = started.elapsed();
        info!(
            unique = total,
            cache_hits,
            cancelled,
            timed_out,
            elapsed_ms = elapsed.as_millis() as u64,
            "Batch lookup finished"
        );

        BatchOutcome {
            results,
            requested,
            unique: total,
            invalid_inputs,
            cache_hits,
            cancelled,
            timed_out,
            elapsed,
        }
    }
}

/// Parse and deduplicate inputs, keeping first-seen order.
fn normalize<I, S>(domains: I) -> (Vec<Domain>, usize, usize)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: FxHashSet<Domain> = FxHashSet::default();
    let mut order = Vec::new();
    let mut requested = 0usize;
    let mut invalid = 0usize;

    for raw in domains {
        requested += 1;
        match Domain::parse(raw.as_ref()) {
            Ok(domain) => {
                if seen.insert(domain.clone()) {
                    order.push(domain);
                }
            }
            Err(e) => {
                invalid += 1;
                debug!(input = raw.as_ref(), error = %e, "Skipping invalid domain");
            }
        }
    }

    (order, requested, invalid)
}

async fn lookup_task(
    domain: Domain,
    client: Arc<LookupClient>,
    cache: Arc<ReputationCache>,
    semaphore: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    cache_failures: bool,
) -> LookupResult {
    let _permit = match semaphore {
        Some(semaphore) => tokio::select! {
            biased;
            _ = cancel.cancelled() => return LookupResult::cancelled(domain),
            permit = semaphore.acquire_owned() => match permit {
                Ok(permit) => Some(permit),
                Err(_) => return LookupResult::cancelled(domain),
            },
        },
        None => None,
    };

    let result = client.lookup(&domain, &cancel).await;

    let cacheable = match &result {
        LookupResult::Success(_) => true,
        LookupResult::Failure(f) => cache_failures && f.kind != LookupErrorKind::Cancelled,
    };
    if cacheable {
        cache.set(domain, result.clone());
    }

    result
}

async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
