//! Environment-variable configuration, read once at startup

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// The bidder whose bids this exporter tracks
    pub bidder_address: String,
    /// GraphQL endpoint of the auction subgraph
    pub api_url: String,
    pub fetching_bids_interval_minutes: u64,
    pub exporter_port: u16,
    pub database_url: String,
}

impl Config {
    /// Panics on missing required variables; the process cannot run
    /// without a bidder address and an API endpoint.
    pub fn from_env() -> Self {
        let bidder_address = env::var("BIDDER_ADDRESS").expect("BIDDER_ADDRESS must be set");
        let api_url = env::var("API_URL").expect("API_URL must be set");

        let fetching_bids_interval_minutes = env::var("FETCHING_BIDS_INTERVAL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let exporter_port = env::var("EXPORTER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://etherfi-bids.db?mode=rwc".to_string());

        Self {
            bidder_address,
            api_url,
            fetching_bids_interval_minutes,
            exporter_port,
            database_url,
        }
    }
}
