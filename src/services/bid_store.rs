//! Upsert batches and aggregate queries over the local bid store.
//!
//! Bidder addresses are matched case-insensitively throughout: the
//! subgraph returns checksummed addresses while operators usually
//! configure lowercase ones.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, OnConflict, SimpleExpr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};

use crate::entities::{bids, validators};
use crate::models::bid::BidRecord;

type StoreResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn bidder_filter(bidder_address: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col((
        bids::Entity,
        bids::Column::BidderAddress,
    ))))
    .eq(bidder_address.to_ascii_lowercase())
}

/// Insert-or-replace one fetch batch in a single transaction. Replacement
/// is total (last write wins, no field merge), and a failure anywhere
/// rolls the whole batch back, leaving the prior committed state visible.
pub async fn record_bids(db: &DatabaseConnection, batch: &[BidRecord]) -> StoreResult<()> {
    let txn = db.begin().await?;

    for bid in batch {
        let model = bids::ActiveModel {
            id: Set(bid.id.clone()),
            bidder_address: Set(bid.bidder_address.clone()),
            pub_key_index: Set(bid.pub_key_index),
            status: Set(bid.status.clone()),
            amount: Set(bid.amount.clone()),
            block_number: Set(bid.block_number),
            block_timestamp: Set(bid.block_timestamp),
            transaction_hash: Set(bid.transaction_hash.clone()),
        };

        bids::Entity::insert(model)
            .on_conflict(
                OnConflict::column(bids::Column::Id)
                    .update_columns([
                        bids::Column::BidderAddress,
                        bids::Column::PubKeyIndex,
                        bids::Column::Status,
                        bids::Column::Amount,
                        bids::Column::BlockNumber,
                        bids::Column::BlockTimestamp,
                        bids::Column::TransactionHash,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;

        // The parent bid is committed in the same transaction, so the
        // FK invariant holds for every reader.
        let Some(validator) = &bid.validator else {
            continue;
        };

        let model = validators::ActiveModel {
            bid_id: Set(bid.id.clone()),
            phase: Set(validator.phase.clone()),
            pub_key: Set(validator.validator_pub_key.clone()),
            block_number: Set(validator.block_number),
            block_timestamp: Set(validator.block_timestamp),
            transaction_hash: Set(validator.transaction_hash.clone()),
        };

        validators::Entity::insert(model)
            .on_conflict(
                OnConflict::column(validators::Column::BidId)
                    .update_columns([
                        validators::Column::Phase,
                        validators::Column::PubKey,
                        validators::Column::BlockNumber,
                        validators::Column::BlockTimestamp,
                        validators::Column::TransactionHash,
                    ])
                    .to_owned(),
            )
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(())
}

/// Bid counts per raw status string for one bidder. Unknown statuses are
/// returned as-is; classifying them is the publisher's job.
pub async fn count_bids_by_status(
    db: &DatabaseConnection,
    bidder_address: &str,
) -> StoreResult<HashMap<String, i64>> {
    let rows: Vec<(String, i64)> = bids::Entity::find()
        .select_only()
        .column(bids::Column::Status)
        .column_as(bids::Column::Id.count(), "count")
        .filter(bidder_filter(bidder_address))
        .group_by(bids::Column::Status)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Validator counts per raw phase string for one bidder, joined through
/// the owning bid.
pub async fn count_validators_by_phase(
    db: &DatabaseConnection,
    bidder_address: &str,
) -> StoreResult<HashMap<String, i64>> {
    let rows: Vec<(String, i64)> = validators::Entity::find()
        .select_only()
        .column(validators::Column::Phase)
        .column_as(validators::Column::BidId.count(), "count")
        .join(JoinType::InnerJoin, validators::Relation::Bids.def())
        .filter(bidder_filter(bidder_address))
        .group_by(validators::Column::Phase)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().collect())
}

/// Numeric min/max over the bidder's ACTIVE bid amounts, or None when the
/// bidder has no active bids. Amounts are wei strings wider than i64, so
/// the comparison happens in Decimal rather than in SQL (where the TEXT
/// column would compare lexicographically).
pub async fn active_amount_range(
    db: &DatabaseConnection,
    bidder_address: &str,
) -> StoreResult<Option<(Decimal, Decimal)>> {
    let amounts: Vec<String> = bids::Entity::find()
        .select_only()
        .column(bids::Column::Amount)
        .filter(bidder_filter(bidder_address))
        .filter(bids::Column::Status.eq("ACTIVE"))
        .into_tuple()
        .all(db)
        .await?;

    let mut range: Option<(Decimal, Decimal)> = None;
    for raw in amounts {
        let amount: Decimal = raw.parse()?;
        range = Some(match range {
            None => (amount, amount),
            Some((min, max)) => (min.min(amount), max.max(amount)),
        });
    }

    Ok(range)
}
