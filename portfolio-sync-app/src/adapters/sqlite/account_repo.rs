//! `AccountRepository` implementation for `SqliteStore`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};

use portfolio_sync_core::error::{CoreError, CoreResult};
use portfolio_sync_core::traits::AccountRepository;
use portfolio_sync_core::types::Account;

use super::entity::account;
use super::{format_timestamp, parse_enum, parse_timestamp, SqliteStore};

impl account::Model {
    /// Convert a `SeaORM` row model into a domain `Account`.
    fn into_account(self) -> CoreResult<Account> {
        Ok(Account {
            platform: parse_enum("platform", self.platform)?,
            created_at: parse_timestamp("created_at", &self.created_at)?,
            updated_at: parse_timestamp("updated_at", &self.updated_at)?,
            last_sync: self
                .last_sync
                .map(|s| parse_timestamp("last_sync", &s))
                .transpose()?,
            id: self.id,
            name: self.name,
            credentials: self.credentials,
        })
    }
}

fn account_to_active_model(account: &Account) -> account::ActiveModel {
    account::ActiveModel {
        id: Set(account.id.clone()),
        name: Set(account.name.clone()),
        platform: Set(account.platform.as_str().to_string()),
        credentials: Set(account.credentials.clone()),
        created_at: Set(format_timestamp(&account.created_at)),
        updated_at: Set(format_timestamp(&account.updated_at)),
        last_sync: Set(account.last_sync.as_ref().map(format_timestamp)),
    }
}

impl SqliteStore {
    /// Insert or replace an account.
    pub async fn save_account(&self, account: &Account) -> CoreResult<()> {
        account::Entity::insert(account_to_active_model(account))
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(account::Column::Id)
                    .update_columns([
                        account::Column::Name,
                        account::Column::Platform,
                        account::Column::Credentials,
                        account::Column::UpdatedAt,
                        account::Column::LastSync,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to save account: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl AccountRepository for SqliteStore {
    async fn find_all(&self) -> CoreResult<Vec<Account>> {
        let rows = account::Entity::find()
            .all(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query accounts: {e}")))?;

        rows.into_iter().map(account::Model::into_account).collect()
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Account>> {
        let row = account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query account: {e}")))?;

        row.map(account::Model::into_account).transpose()
    }

    async fn update_last_sync(&self, id: &str, timestamp: DateTime<Utc>) -> CoreResult<()> {
        let stamp = format_timestamp(&timestamp);

        // Only ever moves forward.
        let result = account::Entity::update_many()
            .col_expr(account::Column::LastSync, Expr::value(stamp.clone()))
            .filter(account::Column::Id.eq(id))
            .filter(
                Condition::any()
                    .add(account::Column::LastSync.is_null())
                    .add(account::Column::LastSync.lt(stamp)),
            )
            .exec(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to update checkpoint: {e}")))?;

        if result.rows_affected > 0 {
            return Ok(());
        }

        let exists = account::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to query account: {e}")))?
            .is_some();
        if exists {
            Ok(())
        } else {
            Err(CoreError::AccountNotFound(id.to_string()))
        }
    }
}
