use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // At most one validator per bid: bid_id is both the primary key
        // and the foreign key into bids. No delete path exists, so no
        // cascade behavior is declared.
        manager
            .create_table(
                Table::create()
                    .table(Validators::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Validators::BidId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Validators::Phase)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Validators::PubKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Validators::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Validators::BlockTimestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Validators::TransactionHash)
                            .string()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_validators_bid_id")
                            .from(Validators::Table, Validators::BidId)
                            .to(Bids::Table, Bids::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on phase for the phase-count query
        manager
            .create_index(
                Index::create()
                    .name("idx_validators_phase")
                    .table(Validators::Table)
                    .col(Validators::Phase)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Validators::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Validators {
    Table,
    BidId,
    Phase,
    PubKey,
    BlockNumber,
    BlockTimestamp,
    TransactionHash,
}

#[derive(DeriveIden)]
enum Bids {
    Table,
    Id,
}
