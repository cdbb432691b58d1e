use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use etherfi_bids_exporter::models::bid::{BidRecord, ValidatorRecord};

/// Fresh in-memory SQLite database with the exporter schema applied.
/// The pool is pinned to one connection: every pooled connection to
/// `sqlite::memory:` would otherwise open its own empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

#[allow(dead_code)]
pub fn bid_record(
    id: &str,
    bidder_address: &str,
    pub_key_index: i64,
    status: &str,
    amount: &str,
) -> BidRecord {
    BidRecord {
        id: id.to_string(),
        bidder_address: bidder_address.to_string(),
        pub_key_index,
        status: status.to_string(),
        amount: amount.to_string(),
        block_number: 17_000_000 + pub_key_index,
        block_timestamp: 1_690_000_000 + pub_key_index,
        transaction_hash: format!("0xtx{}", pub_key_index),
        validator: None,
    }
}

#[allow(dead_code)]
pub fn with_validator(mut bid: BidRecord, phase: &str) -> BidRecord {
    bid.validator = Some(ValidatorRecord {
        id: bid.id.clone(),
        phase: phase.to_string(),
        validator_pub_key: format!("0xpub{}", bid.pub_key_index),
        block_number: bid.block_number,
        block_timestamp: bid.block_timestamp,
        transaction_hash: bid.transaction_hash.clone(),
    });
    bid
}
