//! `SeaORM` entity for the `transactions` table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
/// Database row model for a transaction. Decimals are stored as their string form.
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub platform: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub external_id: String,
    pub account_id: String,
    pub kind: String,
    pub symbol: Option<String>,
    pub quantity: String,
    pub unit_price: String,
    pub amount: String,
    pub fee: String,
    pub currency: String,
    pub executed_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
