//! SeaORM Entity for the validators table
//!
//! bid_id doubles as primary key and foreign key, which enforces the
//! at-most-one-validator-per-bid invariant at the schema level.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "validators")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub bid_id: String,
    /// Raw lifecycle phase string from the subgraph
    pub phase: String,
    pub pub_key: String,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub transaction_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bids::Entity",
        from = "Column::BidId",
        to = "super::bids::Column::Id"
    )]
    Bids,
}

impl Related<super::bids::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bids.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
