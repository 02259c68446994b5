//! Concurrent fan-out over a source set
//!
//! One task per source, all joined before the result is assembled. A failing
//! source never cancels its siblings; it shows up as a `Failed` entry instead.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::error::EngineError;
use crate::fetcher::SourceFetcher;
use crate::types::{AggregateResult, SourceSet};

/// Fans a [`SourceSet`] out to a [`SourceFetcher`] and merges the outcomes
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<dyn SourceFetcher>,
}

impl Aggregator {
    /// Create an aggregator over the given fetcher
    pub fn new(fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self { fetcher }
    }

    /// Fetch every source concurrently and wait for all of them
    ///
    /// The returned result has exactly one entry per source. A panicked fetch
    /// task is an engine fault and yields [`EngineError::Unexpected`], but only
    /// after every other task has finished.
    pub async fn aggregate(&self, sources: &SourceSet) -> Result<AggregateResult, EngineError> {
        let mut tasks = JoinSet::new();
        for source in sources.iter() {
            let fetcher = Arc::clone(&self.fetcher);
            let source = source.clone();
            tasks.spawn(
                async move {
                    let outcome = fetcher.fetch(&source).await;
                    (source, outcome)
                }
                .in_current_span(),
            );
        }

        let mut result = AggregateResult::new();
        let mut fault = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((source, outcome)) => result.insert(source, outcome),
                Err(e) => {
                    tracing::error!(error = %e, "Fetch task did not complete");
                    fault.get_or_insert_with(|| e.to_string());
                }
            }
        }

        if let Some(detail) = fault {
            return Err(EngineError::Unexpected(detail));
        }
        if result.len() != sources.len() {
            return Err(EngineError::Unexpected(format!(
                "expected {} outcomes, got {}",
                sources.len(),
                result.len()
            )));
        }

        tracing::debug!(entries = result.len(), "Aggregation complete");
        Ok(result)
    }
}
