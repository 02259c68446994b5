//! Aggregation engine
//!
//! Entry point used by the HTTP layer: result cache in front of the
//! aggregator, post-processing applied to a copy of whatever the cache returns.

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::cache::ResultCache;
use crate::config::Config;
use crate::error::{EngineError, Result};
use crate::fetcher::{HttpFetcher, SourceFetcher};
use crate::postprocess::Sorter;
use crate::types::{AggregateResult, CacheStatus, SourceSet};

/// Post-processed aggregate plus how the cache served it
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation {
    /// Filtered and sorted result
    pub result: AggregateResult,
    /// Cache outcome for the underlying aggregate
    pub cache: CacheStatus,
}

/// Cache, aggregator and post-processor wired together
///
/// Cloning is cheap and every clone shares the same cache.
#[derive(Clone)]
pub struct AggregationEngine {
    aggregator: Aggregator,
    cache: ResultCache,
    sorter: Arc<Sorter>,
}

impl AggregationEngine {
    /// Validate `config` and build an engine that fetches over HTTP
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Build an engine around a custom fetcher
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn SourceFetcher>) -> Self {
        Self {
            aggregator: Aggregator::new(fetcher),
            cache: ResultCache::new(config.cache.clone()),
            sorter: Arc::new(Sorter::new()),
        }
    }

    /// The shared result cache
    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    /// Aggregate `sources`, then filter by `filter_by` and sort by `sort_by`
    pub async fn aggregate(
        &self,
        sources: &SourceSet,
        sort_by: Option<&str>,
        filter_by: Option<&str>,
    ) -> std::result::Result<Aggregation, EngineError> {
        if sources.is_empty() {
            return Err(EngineError::EmptySourceSet);
        }

        let aggregator = self.aggregator.clone();
        let set = sources.clone();
        let (result, cache) = self
            .cache
            .get_or_compute(sources, move || async move { aggregator.aggregate(&set).await })
            .await?;

        let result = self.sorter.apply(result, filter_by, sort_by);
        tracing::debug!(
            sources = sources.len(),
            entries = result.len(),
            cache = %cache,
            "Aggregate served"
        );
        Ok(Aggregation { result, cache })
    }
}
