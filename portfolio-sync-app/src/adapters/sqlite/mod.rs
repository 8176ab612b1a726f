//! SQLite-based store using `SeaORM`.
//!
//! A single `SqliteStore` implements `AccountRepository` and `TransactionRepository`
//! against one local `SQLite` database. Credential tokens are stored as-is: they are
//! already sealed by the vault.

mod account_repo;
pub(crate) mod entity;
mod migration;
mod transaction_repo;

use std::path::Path;

use portfolio_sync_core::error::{CoreError, CoreResult};
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use migration::Migrator;

/// SQLite-based store for accounts and transactions.
pub struct SqliteStore {
    /// Shared `SeaORM` database connection.
    pub(crate) db: DatabaseConnection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and bring its schema up to date.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if directory creation, database
    /// connection, or schema migration fails.
    pub async fn new(db_path: &Path) -> CoreResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to connect to SQLite: {e}")))?;

        Migrator::up(&db, None)
            .await
            .map_err(|e| CoreError::StorageError(format!("Failed to run migrations: {e}")))?;

        Ok(Self { db })
    }
}

/// Fixed-width UTC form, so stored timestamps compare chronologically as strings.
fn format_timestamp(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true)
}

fn parse_timestamp(field: &str, value: &str) -> CoreResult<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| CoreError::StorageError(format!("Invalid {field}: {e}")))
}

/// Decode a serde unit-variant enum stored as its string form.
fn parse_enum<T: serde::de::DeserializeOwned>(field: &str, value: String) -> CoreResult<T> {
    serde_json::from_value(serde_json::Value::String(value))
        .map_err(|e| CoreError::StorageError(format!("Invalid {field}: {e}")))
}
