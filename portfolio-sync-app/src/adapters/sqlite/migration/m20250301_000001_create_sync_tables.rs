use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Account::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Account::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Account::Name).string().not_null())
                    .col(ColumnDef::new(Account::Platform).string().not_null())
                    .col(ColumnDef::new(Account::Credentials).string().not_null())
                    .col(ColumnDef::new(Account::CreatedAt).string().not_null())
                    .col(ColumnDef::new(Account::UpdatedAt).string().not_null())
                    .col(ColumnDef::new(Account::LastSync).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transaction::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Transaction::Platform).string().not_null())
                    .col(ColumnDef::new(Transaction::ExternalId).string().not_null())
                    .col(ColumnDef::new(Transaction::AccountId).string().not_null())
                    .col(ColumnDef::new(Transaction::Kind).string().not_null())
                    .col(ColumnDef::new(Transaction::Symbol).string().null())
                    .col(ColumnDef::new(Transaction::Quantity).string().not_null())
                    .col(ColumnDef::new(Transaction::UnitPrice).string().not_null())
                    .col(ColumnDef::new(Transaction::Amount).string().not_null())
                    .col(ColumnDef::new(Transaction::Fee).string().not_null())
                    .col(ColumnDef::new(Transaction::Currency).string().not_null())
                    .col(ColumnDef::new(Transaction::ExecutedAt).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(Transaction::Platform)
                            .col(Transaction::ExternalId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_account")
                    .table(Transaction::Table)
                    .col(Transaction::AccountId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transaction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Account::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Account {
    #[sea_orm(iden = "accounts")]
    Table,
    Id,
    Name,
    Platform,
    Credentials,
    CreatedAt,
    UpdatedAt,
    LastSync,
}

#[derive(DeriveIden)]
enum Transaction {
    #[sea_orm(iden = "transactions")]
    Table,
    Platform,
    ExternalId,
    AccountId,
    Kind,
    Symbol,
    Quantity,
    UnitPrice,
    Amount,
    Fee,
    Currency,
    ExecutedAt,
}
