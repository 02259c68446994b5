//! REST API server demo
//!
//! Runs the aggregation engine behind its HTTP API.
//!
//! ```bash
//! cargo run --example aggregate_server                 # defaults
//! cargo run --example aggregate_server -- config.json  # JSON config file
//! ```
//!
//! `API_AGGREGATOR_CONFIG` may name the config file instead of the first
//! argument. `RUST_LOG` overrides the default log filter.

use api_aggregator::api::start_api_server;
use api_aggregator::{AggregationEngine, Config};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("api_aggregator=debug,info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("API_AGGREGATOR_CONFIG").ok());
    let config = match config_path {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration");
            Config::from_json_file(&path)?
        }
        None => Config::default(),
    };

    let engine = AggregationEngine::new(&config)?;
    let address = config.server.bind_address;

    println!("Starting api-aggregator on http://{address}");
    if config.server.swagger_ui {
        println!("Swagger UI: http://{address}/swagger-ui");
    }
    println!();
    println!("Example:");
    println!("  curl -X POST 'http://{address}/api/aggregate?sortBy=title&filterBy=qui' \\");
    println!("    -H 'Content-Type: application/json' \\");
    println!(
        "    -d '{{\"api_urls\": [\"https://jsonplaceholder.typicode.com/posts\", \"https://reqres.in/api/users?page=2\"]}}'"
    );
    println!();

    start_api_server(engine, Arc::new(config)).await?;
    Ok(())
}
