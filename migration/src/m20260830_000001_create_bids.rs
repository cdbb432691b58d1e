use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Latest-known state of every bid for the configured bidder.
        // Rows are only ever inserted or replaced, never deleted.
        manager
            .create_table(
                Table::create()
                    .table(Bids::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bids::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Bids::BidderAddress)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::PubKeyIndex)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::Status)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::Amount)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::BlockTimestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Bids::TransactionHash)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on bidder_address for the per-bidder aggregate queries
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_bidder_address")
                    .table(Bids::Table)
                    .col(Bids::BidderAddress)
                    .to_owned(),
            )
            .await?;

        // Index on status for the status-count and extrema queries
        manager
            .create_index(
                Index::create()
                    .name("idx_bids_status")
                    .table(Bids::Table)
                    .col(Bids::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Bids::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    Id,
    BidderAddress,
    PubKeyIndex,
    Status,
    Amount,
    BlockNumber,
    BlockTimestamp,
    TransactionHash,
}
