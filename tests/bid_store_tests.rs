mod common;

use rust_decimal::Decimal;
use sea_orm::EntityTrait;

use etherfi_bids_exporter::entities::bids;
use etherfi_bids_exporter::services::bid_store;

use crate::common::{bid_record, setup_test_db, with_validator};

const BIDDER: &str = "0x5b3f7a9c0e1d2f4a6b8c0d2e4f6a8b0c2d4e6f8a";

/// Upserting the identical batch twice must leave the aggregates unchanged
#[tokio::test]
async fn test_upsert_is_idempotent() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![
        bid_record("bid-1", BIDDER, 1, "ACTIVE", "100000000000000000"),
        with_validator(
            bid_record("bid-2", BIDDER, 2, "WON", "200000000000000000"),
            "LIVE",
        ),
    ];

    bid_store::record_bids(&db, &batch).await.unwrap();
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("ACTIVE"), Some(&1));
    assert_eq!(counts.get("WON"), Some(&1));

    let phases = bid_store::count_validators_by_phase(&db, BIDDER)
        .await
        .unwrap();
    assert_eq!(phases.get("LIVE"), Some(&1));

    let stored = bids::Entity::find().all(&db).await.unwrap();
    assert_eq!(stored.len(), 2);
}

/// Re-upserting a bid under the same id with a new status must move the
/// count from the old status to the new one
#[tokio::test]
async fn test_upsert_overwrites_status() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![bid_record("bid-1", BIDDER, 1, "ACTIVE", "100000000000000000")];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let batch = vec![bid_record("bid-1", BIDDER, 1, "WON", "100000000000000000")];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("WON"), Some(&1));
    assert_eq!(counts.get("ACTIVE"), None);
}

/// Duplicate ids inside one batch (overlapping pagination windows) are
/// harmless: the last occurrence wins
#[tokio::test]
async fn test_duplicate_ids_in_one_batch() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![
        bid_record("bid-1", BIDDER, 1, "ACTIVE", "100000000000000000"),
        bid_record("bid-1", BIDDER, 1, "CANCELLED", "100000000000000000"),
    ];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("CANCELLED"), Some(&1));
    assert_eq!(counts.get("ACTIVE"), None);
}

/// A stored bidder address differing only in case still matches
#[tokio::test]
async fn test_bidder_match_is_case_insensitive() {
    let db = setup_test_db().await.unwrap();

    let checksummed = "0x5B3F7A9C0E1D2F4A6B8C0D2E4F6A8B0C2D4E6F8A";
    let batch = vec![with_validator(
        bid_record("bid-1", checksummed, 1, "ACTIVE", "100000000000000000"),
        "STAKE_DEPOSITED",
    )];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("ACTIVE"), Some(&1));

    let phases = bid_store::count_validators_by_phase(&db, BIDDER)
        .await
        .unwrap();
    assert_eq!(phases.get("STAKE_DEPOSITED"), Some(&1));

    let range = bid_store::active_amount_range(&db, BIDDER).await.unwrap();
    assert!(range.is_some());
}

/// Another bidder's bids and validators never leak into our aggregates
#[tokio::test]
async fn test_aggregates_are_scoped_to_bidder() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![
        bid_record("bid-1", BIDDER, 1, "ACTIVE", "100000000000000000"),
        with_validator(
            bid_record("bid-2", "0xsomeoneelse", 2, "ACTIVE", "900000000000000000"),
            "LIVE",
        ),
    ];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("ACTIVE"), Some(&1));

    let phases = bid_store::count_validators_by_phase(&db, BIDDER)
        .await
        .unwrap();
    assert!(phases.is_empty());
}

/// No active bids is a defined empty result, not an error
#[tokio::test]
async fn test_amount_range_empty_without_active_bids() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![bid_record("bid-1", BIDDER, 1, "CANCELLED", "100000000000000000")];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let range = bid_store::active_amount_range(&db, BIDDER).await.unwrap();
    assert_eq!(range, None);
}

/// Amounts compare by numeric magnitude, not as strings: "9" < "10...0"
/// even though it sorts after it lexicographically
#[tokio::test]
async fn test_amount_range_compares_numerically() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![
        bid_record("bid-1", BIDDER, 1, "ACTIVE", "9"),
        bid_record("bid-2", BIDDER, 2, "ACTIVE", "10000000000000000000"),
        bid_record("bid-3", BIDDER, 3, "ACTIVE", "200000000000000000"),
    ];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let (min, max) = bid_store::active_amount_range(&db, BIDDER)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(min, Decimal::from(9u64));
    assert_eq!(max, "10000000000000000000".parse::<Decimal>().unwrap());
}

/// Unknown statuses stay in the raw map for the publisher to log
#[tokio::test]
async fn test_unknown_status_is_returned_raw() {
    let db = setup_test_db().await.unwrap();

    let batch = vec![bid_record("bid-1", BIDDER, 1, "EXPIRED", "100000000000000000")];
    bid_store::record_bids(&db, &batch).await.unwrap();

    let counts = bid_store::count_bids_by_status(&db, BIDDER).await.unwrap();
    assert_eq!(counts.get("EXPIRED"), Some(&1));
}
