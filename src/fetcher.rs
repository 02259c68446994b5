//! Per-source fetching
//!
//! [`SourceFetcher`] is the seam between the aggregator and the network.
//! [`HttpFetcher`] is the real implementation: one GET per attempt with a
//! per-attempt timeout, decoding folded into the same retry loop.

use async_trait::async_trait;
use tracing::Instrument;

use crate::classifier::{Classifier, Shape};
use crate::config::{Config, FetchConfig, RetryConfig};
use crate::decode::decode;
use crate::error::{Error, FetchError, Result};
use crate::retry::with_retry;
use crate::types::FetchOutcome;

/// Fetches one source and resolves every failure into [`FetchOutcome::Failed`]
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch and decode a single source. Never fails.
    async fn fetch(&self, source: &str) -> FetchOutcome;
}

/// Diagnostic stored for a source whose attempts were all exhausted
pub fn failure_message(source: &str, attempts: u32) -> String {
    format!("Error fetching from {source}, tried {attempts} times.")
}

/// HTTP implementation of [`SourceFetcher`] backed by `reqwest`
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    classifier: Classifier,
    retry: RetryConfig,
}

impl HttpFetcher {
    /// Build a fetcher with the given fetch settings and classifier
    pub fn new(fetch: &FetchConfig, classifier: Classifier) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch.timeout)
            .user_agent(fetch.user_agent.as_str())
            .build()
            .map_err(|e| Error::config("fetch", format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            classifier,
            retry: fetch.retry.clone(),
        })
    }

    /// Build a fetcher from the full configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.fetch, config.classifier.classifier())
    }

    async fn attempt(
        &self,
        shape: Shape,
        source: &str,
    ) -> std::result::Result<FetchOutcome, FetchError> {
        let response = self.client.get(source).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        decode(shape, &body)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, source: &str) -> FetchOutcome {
        let shape = self.classifier.classify(source);
        let span = tracing::info_span!("fetch", source = %source, shape = %shape);

        async {
            match with_retry(&self.retry, || self.attempt(shape, source)).await {
                Ok(outcome) => outcome,
                Err(exhausted) => FetchOutcome::failed(failure_message(source, exhausted.attempts)),
            }
        }
        .instrument(span)
        .await
    }
}
