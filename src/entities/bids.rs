//! SeaORM Entity for the bids table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bids")]
pub struct Model {
    /// Subgraph entity id, globally unique
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub bidder_address: String,
    /// Pagination cursor and global sort key
    pub pub_key_index: i64,
    /// Raw status string from the subgraph (WON / ACTIVE / CANCELLED / other)
    pub status: String,
    /// Wei amount as a decimal string; wider than i64, compared numerically
    pub amount: String,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub transaction_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::validators::Entity")]
    Validators,
}

impl Related<super::validators::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Validators.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
