//! Test configuration helpers

use api_aggregator::config::ClassifierConfig;
use api_aggregator::{ClassifierRule, Config, Shape};
use std::time::Duration;

/// Configuration whose classifier recognizes mock-server paths
///
/// `/weather` is weather, `/posts` is a post list, `/users` is a user page.
/// The fetch timeout is short so timeout tests stay fast.
pub fn mock_config() -> Config {
    let mut config = Config::default();
    config.fetch.timeout = Duration::from_millis(500);
    config.classifier = ClassifierConfig {
        rules: vec![
            ClassifierRule::new("/weather", Shape::Weather),
            ClassifierRule::new("/posts", Shape::PostList),
            ClassifierRule::new("/users", Shape::UserPage),
        ],
    };
    config
}

/// Whether live third-party API credentials are available
///
/// Reads `.env` first. Only `OPENWEATHER_API_KEY` is required.
pub fn openweather_api_key() -> Option<String> {
    dotenvy::dotenv().ok();
    std::env::var("OPENWEATHER_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}
