//! Application state for the API server

use crate::{AggregationEngine, Config};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request; the engine and its cache are shared by every clone.
#[derive(Clone)]
pub struct AppState {
    /// Aggregation engine (owns the result cache)
    pub engine: AggregationEngine,

    /// Configuration, read-only
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(engine: AggregationEngine, config: Arc<Config>) -> Self {
        Self { engine, config }
    }
}
