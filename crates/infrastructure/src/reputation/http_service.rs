use async_trait::async_trait;
use dns_reputation_application::ports::{ReputationPayload, ReputationService, ServiceError};
use dns_reputation_domain::config::ApiConfig;
use dns_reputation_domain::{ConfigError, Domain};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Longest error body kept in a `ServiceError::Status` message.
const MAX_ERROR_BODY: usize = 200;

const USER_AGENT: &str = concat!("dns-reputation/", env!("CARGO_PKG_VERSION"));

/// Success body of the reputation endpoint.
#[derive(Debug, Deserialize)]
struct ReputationBody {
    #[serde(alias = "score")]
    reputation: f64,
    #[serde(default)]
    categories: Vec<String>,
}

/// HTTP client for the remote reputation service.
///
/// `GET {base_url}/{domain}` with the credential in the configured header.
/// 200 carries `{"reputation": <number>, "categories": [..]}`, 429 means
/// throttled (optionally with `Retry-After` seconds), anything else is a
/// status error.
pub struct HttpReputationService {
    client: reqwest::Client,
    base_url: String,
    auth: Option<(HeaderName, HeaderValue)>,
}

impl HttpReputationService {
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(16)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ConfigError::invalid("api", format!("cannot build HTTP client: {}", e)))?;

        let auth = match &config.auth_token {
            Some(token) => {
                let name = HeaderName::from_bytes(config.auth_header.as_bytes())
                    .map_err(|e| ConfigError::invalid("api.auth_header", e.to_string()))?;
                let mut value = HeaderValue::from_str(token)
                    .map_err(|e| ConfigError::invalid("api.auth_token", e.to_string()))?;
                value.set_sensitive(true);
                Some((name, value))
            }
            None => None,
        };

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn url_for(&self, domain: &Domain) -> String {
        format!("{}/{}", self.base_url, domain)
    }
}

#[async_trait]
impl ReputationService for HttpReputationService {
    async fn query(&self, domain: &Domain) -> Result<ReputationPayload, ServiceError> {
        let url = self.url_for(domain);
        debug!(url = %url, "Sending reputation request");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json");
        if let Some((name, value)) = &self.auth {
            request = request.header(name.clone(), value.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::Transport(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            return Err(ServiceError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Status {
                code: status.as_u16(),
                message: status_message(status, &body),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ServiceError::Transport(format!("failed to read response body: {}", e)))?;

        let body: ReputationBody = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::InvalidPayload(e.to_string()))?;

        if !body.reputation.is_finite() {
            return Err(ServiceError::InvalidPayload(format!(
                "reputation is not a number: {}",
                body.reputation
            )));
        }

        debug!(
            domain = %domain,
            score = body.reputation,
            categories = body.categories.len(),
            "Reputation response received"
        );

        Ok(ReputationPayload::new(
            body.reputation.round() as i64,
            body.categories,
        ))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

/// `Retry-After` in delta-seconds form; HTTP dates fall back to the default cooldown.
fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

fn status_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status.canonical_reason().unwrap_or("Unknown").to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
