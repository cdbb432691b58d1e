// src/lib.rs

use sea_orm::DatabaseConnection;

use crate::metrics::ExporterMetrics;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub metrics: ExporterMetrics,
}

pub mod config;
pub mod metrics;

pub mod entities {
    pub mod bids;
    pub mod validators;
}

pub mod models {
    pub mod bid;
}

pub mod services {
    pub mod bid_store;
    pub mod subgraph;
}

pub mod handlers {
    pub mod metrics_endpoint;
}

pub mod jobs {
    pub mod bids_sync;
}
