use dns_reputation_application::ports::ReportWriter;
use dns_reputation_application::services::{LookupClient, LookupPolicy, RateLimiter, ReputationCache};
use dns_reputation_application::use_cases::{
    BatchLookupUseCase, BatchOptions, BuildReportUseCase, PublishReportUseCase,
};
use dns_reputation_domain::Config;
use dns_reputation_infrastructure::report::{CsvReportWriter, JsonReportWriter};
use dns_reputation_infrastructure::reputation::HttpReputationService;
use std::sync::Arc;
use tracing::info;

/// Everything one analysis run needs, wired from the configuration.
pub struct AnalysisServices {
    pub client: Arc<LookupClient>,
    pub cache: Arc<ReputationCache>,
    pub batch: BatchLookupUseCase,
    pub build_report: BuildReportUseCase,
    pub publish_report: Arc<PublishReportUseCase>,
}

impl AnalysisServices {
    /// `source` is recorded in the JSON report.
    pub fn new(config: &Config, source: &str) -> anyhow::Result<Self> {
        let service = Arc::new(HttpReputationService::new(&config.api)?);
        let limiter = Arc::new(RateLimiter::new(config.engine.requests_per_second)?);
        let client = Arc::new(LookupClient::new(
            service,
            limiter,
            LookupPolicy::from_config(&config.api),
        ));
        let cache = Arc::new(ReputationCache::from_config(&config.engine));

        let batch = BatchLookupUseCase::new(Arc::clone(&client), Arc::clone(&cache))
            .with_options(BatchOptions::from_config(&config.engine));

        let mut writers: Vec<Arc<dyn ReportWriter>> = Vec::new();
        if config.output.csv {
            writers.push(Arc::new(CsvReportWriter::new(&config.output.directory)));
        }
        if config.output.json {
            writers.push(Arc::new(
                JsonReportWriter::new(&config.output.directory).with_source(source),
            ));
        }

        info!(
            writers = writers.len(),
            output_dir = %config.output.directory.display(),
            "Services initialized"
        );

        Ok(Self {
            client,
            cache,
            batch,
            build_report: BuildReportUseCase::new(),
            publish_report: Arc::new(PublishReportUseCase::new(writers)),
        })
    }
}
