//! The fetch → store → publish cycle and the loop that drives it.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use tokio::time::{sleep, Duration};

use crate::metrics::ExporterMetrics;
use crate::models::bid::{BidStatus, ValidatorPhase};
use crate::services::bid_store;
use crate::services::subgraph::SubgraphService;

type JobResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

pub async fn start_bids_sync_job(
    db: DatabaseConnection,
    subgraph: SubgraphService,
    metrics: ExporterMetrics,
    bidder_address: String,
    interval_minutes: u64,
) {
    tokio::spawn(async move {
        loop {
            run_cycle(&db, &subgraph, &metrics, &bidder_address).await;
            tracing::info!("Sleeping {}min", interval_minutes);
            sleep(Duration::from_secs(interval_minutes * 60)).await;
        }
    });
}

/// One full pass. Steps are error-isolated: a failing remote call is
/// logged and the remaining steps still publish from the last committed
/// local state. Nothing here may take the loop down.
pub async fn run_cycle(
    db: &DatabaseConnection,
    subgraph: &SubgraphService,
    metrics: &ExporterMetrics,
    bidder_address: &str,
) {
    if let Err(e) = publish_remote_extrema(subgraph, metrics).await {
        tracing::error!("Failed to publish remote active-bid extrema: {}", e);
    }

    if let Err(e) = sync_bids(db, subgraph, bidder_address).await {
        tracing::error!("Failed to sync bids: {}", e);
    }

    if let Err(e) = publish_local_extrema(db, metrics, bidder_address).await {
        tracing::error!("Failed to publish our active-bid extrema: {}", e);
    }

    if let Err(e) = publish_status_counts(db, metrics, bidder_address).await {
        tracing::error!("Failed to publish bid status counts: {}", e);
    }

    if let Err(e) = publish_validator_phases(db, metrics, bidder_address).await {
        tracing::error!("Failed to publish validator phase counts: {}", e);
    }
}

async fn sync_bids(
    db: &DatabaseConnection,
    subgraph: &SubgraphService,
    bidder_address: &str,
) -> JobResult {
    let bids = subgraph.fetch_all_bids(bidder_address).await?;
    bid_store::record_bids(db, &bids).await?;
    tracing::info!("Recorded bids: {}", bids.len());
    Ok(())
}

/// Cheapest and dearest ACTIVE bid across all bidders, labeled with the
/// owning bidder's address. Skipped (not zeroed) when the subgraph
/// reports no active bids at all.
async fn publish_remote_extrema(
    subgraph: &SubgraphService,
    metrics: &ExporterMetrics,
) -> JobResult {
    let Some((min, max)) = subgraph.fetch_active_extrema().await? else {
        tracing::info!("Subgraph reported no active bids, leaving extrema untouched");
        return Ok(());
    };

    // Parse both amounts up front: a malformed record must skip the pair
    // as a whole, never leave one gauge freshly written and the other stale.
    let min_amount = parse_amount(&min.amount)?;
    let max_amount = parse_amount(&max.amount)?;

    metrics
        .bids_amount_min
        .with_label_values(&[min.bidder_address.as_str(), "active"])
        .set(min_amount);
    tracing::info!(
        "Minimum amount of active bids by {}: {}",
        min.bidder_address,
        min.amount
    );

    metrics
        .bids_amount_max
        .with_label_values(&[max.bidder_address.as_str(), "active"])
        .set(max_amount);
    tracing::info!(
        "Maximum amount of active bids by {}: {}",
        max.bidder_address,
        max.amount
    );

    Ok(())
}

/// Our own min/max active amounts. Published every cycle; no active bids
/// reads as 0 rather than as a stale or missing series.
async fn publish_local_extrema(
    db: &DatabaseConnection,
    metrics: &ExporterMetrics,
    bidder_address: &str,
) -> JobResult {
    let (min, max) = match bid_store::active_amount_range(db, bidder_address).await? {
        Some((min, max)) => (decimal_to_f64(min)?, decimal_to_f64(max)?),
        None => {
            tracing::info!("No active bids of ours in the store");
            (0.0, 0.0)
        }
    };

    metrics
        .bids_amount_min
        .with_label_values(&[bidder_address, "active"])
        .set(min);
    tracing::info!(
        "Minimum amount of our active bids by {}: {}",
        bidder_address,
        min
    );

    metrics
        .bids_amount_max
        .with_label_values(&[bidder_address, "active"])
        .set(max);
    tracing::info!(
        "Maximum amount of our active bids by {}: {}",
        bidder_address,
        max
    );

    Ok(())
}

/// All three status gauges are written every cycle, zero-filled, so a
/// status that disappears is driven back to zero. Unknown statuses are
/// logged and never published.
async fn publish_status_counts(
    db: &DatabaseConnection,
    metrics: &ExporterMetrics,
    bidder_address: &str,
) -> JobResult {
    let rows = bid_store::count_bids_by_status(db, bidder_address).await?;

    let mut counts: HashMap<BidStatus, i64> =
        BidStatus::ALL.iter().map(|status| (*status, 0)).collect();
    for (status, count) in rows {
        match BidStatus::parse(&status) {
            Some(known) => {
                counts.insert(known, count);
            }
            None => tracing::info!("Unknown bid status: {} ({})", status, count),
        }
    }

    for status in BidStatus::ALL {
        let count = counts[&status];
        match status {
            BidStatus::Won => {
                metrics
                    .winning_bids
                    .with_label_values(&[bidder_address])
                    .set(count);
                tracing::info!("Winning bids: {}", count);
            }
            BidStatus::Active => {
                metrics
                    .active_bids
                    .with_label_values(&[bidder_address])
                    .set(count);
                tracing::info!("Active bids: {}", count);
            }
            BidStatus::Cancelled => {
                metrics
                    .cancelled_bids
                    .with_label_values(&[bidder_address])
                    .set(count);
                tracing::info!("Cancelled bids: {}", count);
            }
        }
    }

    Ok(())
}

/// One gauge value per known phase every cycle, zero-filled, labeled with
/// the lowercase phase name. Unknown phases are logged and never become
/// new label values.
async fn publish_validator_phases(
    db: &DatabaseConnection,
    metrics: &ExporterMetrics,
    bidder_address: &str,
) -> JobResult {
    let rows = bid_store::count_validators_by_phase(db, bidder_address).await?;

    let mut counts: HashMap<ValidatorPhase, i64> =
        ValidatorPhase::ALL.iter().map(|phase| (*phase, 0)).collect();
    for (phase, count) in rows {
        match ValidatorPhase::parse(&phase) {
            Some(known) => {
                counts.insert(known, count);
            }
            None => tracing::info!("Unknown validator phase: {} ({})", phase, count),
        }
    }

    for phase in ValidatorPhase::ALL {
        let count = counts[&phase];
        let label = phase.label();
        metrics
            .validators_phase
            .with_label_values(&[label.as_str()])
            .set(count);
        tracing::info!("Phase {} validators: {}", phase.as_str(), count);
    }

    Ok(())
}

fn parse_amount(raw: &str) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
    let amount: Decimal = raw.parse()?;
    decimal_to_f64(amount)
}

fn decimal_to_f64(amount: Decimal) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
    amount
        .to_f64()
        .ok_or_else(|| format!("amount {} is not representable as f64", amount).into())
}
