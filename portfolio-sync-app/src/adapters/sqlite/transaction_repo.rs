//! `TransactionRepository` implementation for `SqliteStore`.

use std::str::FromStr;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};

use portfolio_sync_core::error::{CoreError, CoreResult};
use portfolio_sync_core::traits::TransactionRepository;
use portfolio_sync_core::types::{PlatformType, Transaction};

use super::entity::transaction;
use super::{format_timestamp, parse_enum, parse_timestamp, SqliteStore};

fn parse_decimal(field: &str, value: &str) -> CoreResult<Decimal> {
    Decimal::from_str(value).map_err(|e| CoreError::StorageError(format!("Invalid {field}: {e}")))
}

impl transaction::Model {
    fn into_transaction(self) -> CoreResult<Transaction> {
        Ok(Transaction {
            platform: parse_enum("platform", self.platform)?,
            kind: parse_enum("kind", self.kind)?,
            quantity: parse_decimal("quantity", &self.quantity)?,
            unit_price: parse_decimal("unit_price", &self.unit_price)?,
            amount: parse_decimal("amount", &self.amount)?,
            fee: parse_decimal("fee", &self.fee)?,
            executed_at: parse_timestamp("executed_at", &self.executed_at)?,
            external_id: self.external_id,
            account_id: self.account_id,
            symbol: self.symbol,
            currency: self.currency,
        })
    }
}

fn transaction_to_active_model(
    record: &Transaction,
    platform: PlatformType,
) -> CoreResult<transaction::ActiveModel> {
    let kind = serde_json::to_value(&record.kind)
        .map_err(|e| CoreError::StorageError(e.to_string()))?
        .as_str()
        .unwrap_or("other")
        .to_string();

    Ok(transaction::ActiveModel {
        platform: Set(platform.as_str().to_string()),
        external_id: Set(record.external_id.clone()),
        account_id: Set(record.account_id.clone()),
        kind: Set(kind),
        symbol: Set(record.symbol.clone()),
        quantity: Set(record.quantity.to_string()),
        unit_price: Set(record.unit_price.to_string()),
        amount: Set(record.amount.to_string()),
        fee: Set(record.fee.to_string()),
        currency: Set(record.currency.clone()),
        executed_at: Set(format_timestamp(&record.executed_at)),
    })
}

impl SqliteStore {
    /// All transactions of an account, oldest first.
    pub async fn find_transactions(&self, account_id: &str) -> CoreResult<Vec<Transaction>> {
        let rows = transaction::Entity::find()
            .filter(transaction::Column::AccountId.eq(account_id))
            .order_by_asc(transaction::Column::ExecutedAt)
            .order_by_asc(transaction::Column::ExternalId)
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query transactions: {e}")))?;

        rows.into_iter()
            .map(transaction::Model::into_transaction)
            .collect()
    }
}

#[async_trait]
impl TransactionRepository for SqliteStore {
    async fn create_batch(
        &self,
        transactions: &[Transaction],
        platform: PlatformType,
    ) -> CoreResult<usize> {
        if transactions.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to begin transaction: {e}")))?;

        // Dropping `txn` without commit rolls the batch back.
        let mut inserted = 0;
        for record in transactions {
            let existing = transaction::Entity::find_by_id((
                platform.as_str().to_string(),
                record.external_id.clone(),
            ))
            .one(&txn)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query transaction: {e}")))?;
            if existing.is_some() {
                continue;
            }

            transaction::Entity::insert(transaction_to_active_model(record, platform)?)
                .exec(&txn)
                .await
                .map_err(|e| {
                    CoreError::StorageError(format!("Failed to insert transaction: {e}"))
                })?;
            inserted += 1;
        }

        txn.commit()
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to commit batch: {e}")))?;

        log::info!(
            "Stored {inserted} of {} {platform} transactions",
            transactions.len()
        );
        Ok(inserted)
    }
}
