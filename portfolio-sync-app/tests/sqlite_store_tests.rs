#![cfg(feature = "sqlite-store")]
#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for `SqliteStore` against a temporary database file.

use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_sync_app::adapters::SqliteStore;
use portfolio_sync_core::error::CoreError;
use portfolio_sync_core::traits::{AccountRepository, TransactionRepository};
use portfolio_sync_core::types::{Account, PlatformType, Transaction, TransactionKind};
use rust_decimal_macros::dec;
use tempfile::TempDir;

async fn open_store() -> (SqliteStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::new(&dir.path().join("data").join("sync.db"))
        .await
        .unwrap();
    (store, dir)
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn account(id: &str, platform: PlatformType) -> Account {
    Account {
        id: id.to_string(),
        name: format!("Account {id}"),
        platform,
        credentials: "sealed-token".to_string(),
        created_at: at(1, 8),
        updated_at: at(1, 8),
        last_sync: None,
    }
}

fn trade(id: &str, account_id: &str, executed_at: DateTime<Utc>) -> Transaction {
    Transaction {
        external_id: id.to_string(),
        account_id: account_id.to_string(),
        platform: PlatformType::BourseDirect,
        kind: TransactionKind::Buy,
        symbol: Some("FR0000120271".to_string()),
        quantity: dec!(12),
        unit_price: dec!(58.4125),
        amount: dec!(-700.95),
        fee: dec!(1.99),
        currency: "EUR".to_string(),
        executed_at,
    }
}

// ===== Accounts =====

#[tokio::test]
async fn account_round_trips() {
    let (store, _dir) = open_store().await;
    store
        .save_account(&account("tr-1", PlatformType::TradeRepublic))
        .await
        .unwrap();

    let loaded = store.find_by_id("tr-1").await.unwrap().unwrap();
    assert_eq!(loaded.platform, PlatformType::TradeRepublic);
    assert_eq!(loaded.credentials, "sealed-token");
    assert_eq!(loaded.created_at, at(1, 8));
    assert!(loaded.last_sync.is_none());

    assert!(store.find_by_id("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn save_account_replaces_existing_row() {
    let (store, _dir) = open_store().await;
    let mut acc = account("bn-1", PlatformType::Binance);
    store.save_account(&acc).await.unwrap();

    acc.name = "Renamed".to_string();
    acc.credentials = "rotated-token".to_string();
    store.save_account(&acc).await.unwrap();

    let all = store.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Renamed");
    assert_eq!(all[0].credentials, "rotated-token");
}

#[tokio::test]
async fn update_last_sync_sets_checkpoint() {
    let (store, _dir) = open_store().await;
    store
        .save_account(&account("bd-1", PlatformType::BourseDirect))
        .await
        .unwrap();

    store.update_last_sync("bd-1", at(5, 12)).await.unwrap();
    let loaded = store.find_by_id("bd-1").await.unwrap().unwrap();
    assert_eq!(loaded.last_sync, Some(at(5, 12)));
    assert_eq!(loaded.name, "Account bd-1");
}

#[tokio::test]
async fn checkpoint_never_moves_backwards() {
    let (store, _dir) = open_store().await;
    store
        .save_account(&account("bn-1", PlatformType::Binance))
        .await
        .unwrap();
    let later = at(5, 12) + Duration::milliseconds(250);

    store.update_last_sync("bn-1", later).await.unwrap();
    // A slower run that started earlier finishes last with an older checkpoint.
    store.update_last_sync("bn-1", at(5, 12)).await.unwrap();
    store.update_last_sync("bn-1", later).await.unwrap();
    assert_eq!(
        store.find_by_id("bn-1").await.unwrap().unwrap().last_sync,
        Some(later)
    );

    store.update_last_sync("bn-1", at(6, 0)).await.unwrap();
    assert_eq!(
        store.find_by_id("bn-1").await.unwrap().unwrap().last_sync,
        Some(at(6, 0))
    );
}

#[tokio::test]
async fn racing_checkpoint_updates_keep_the_newest() {
    let (store, _dir) = open_store().await;
    store
        .save_account(&account("tr-1", PlatformType::TradeRepublic))
        .await
        .unwrap();

    let (a, b) = tokio::join!(
        store.update_last_sync("tr-1", at(7, 9)),
        store.update_last_sync("tr-1", at(3, 9)),
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(
        store.find_by_id("tr-1").await.unwrap().unwrap().last_sync,
        Some(at(7, 9))
    );
}

#[tokio::test]
async fn update_last_sync_on_missing_account_fails() {
    let (store, _dir) = open_store().await;
    let err = store.update_last_sync("ghost", at(5, 12)).await.unwrap_err();
    assert!(matches!(err, CoreError::AccountNotFound(id) if id == "ghost"));
}

// ===== Transactions =====

#[tokio::test]
async fn create_batch_counts_only_new_rows() {
    let (store, _dir) = open_store().await;
    let first = vec![trade("T1", "bd-1", at(2, 9)), trade("T2", "bd-1", at(3, 9))];
    assert_eq!(
        store
            .create_batch(&first, PlatformType::BourseDirect)
            .await
            .unwrap(),
        2
    );

    let second = vec![trade("T2", "bd-1", at(3, 9)), trade("T3", "bd-1", at(4, 9))];
    assert_eq!(
        store
            .create_batch(&second, PlatformType::BourseDirect)
            .await
            .unwrap(),
        1
    );
    assert_eq!(store.find_transactions("bd-1").await.unwrap().len(), 3);
}

#[tokio::test]
async fn duplicates_inside_one_batch_are_stored_once() {
    let (store, _dir) = open_store().await;
    let batch = vec![
        trade("T1", "bd-1", at(2, 9)),
        trade("T1", "bd-1", at(2, 9)),
        trade("T2", "bd-1", at(2, 10)),
    ];
    let stored = store
        .create_batch(&batch, PlatformType::BourseDirect)
        .await
        .unwrap();
    assert_eq!(stored, 2);
}

#[tokio::test]
async fn same_external_id_on_another_platform_is_distinct() {
    let (store, _dir) = open_store().await;
    let batch = vec![trade("T1", "bd-1", at(2, 9))];
    store
        .create_batch(&batch, PlatformType::BourseDirect)
        .await
        .unwrap();

    let mut other = trade("T1", "bn-1", at(2, 9));
    other.platform = PlatformType::Binance;
    let stored = store
        .create_batch(&[other], PlatformType::Binance)
        .await
        .unwrap();
    assert_eq!(stored, 1);
}

#[tokio::test]
async fn empty_batch_stores_nothing() {
    let (store, _dir) = open_store().await;
    let stored = store
        .create_batch(&[], PlatformType::Binance)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn transactions_come_back_oldest_first_with_exact_decimals() {
    let (store, _dir) = open_store().await;
    let batch = vec![
        trade("T3", "bd-1", at(9, 9)),
        trade("T1", "bd-1", at(2, 9)),
        trade("T2", "bd-1", at(2, 9) + Duration::hours(3)),
        trade("X1", "bd-2", at(1, 9)),
    ];
    store
        .create_batch(&batch, PlatformType::BourseDirect)
        .await
        .unwrap();

    let loaded = store.find_transactions("bd-1").await.unwrap();
    let ids: Vec<&str> = loaded.iter().map(|t| t.external_id.as_str()).collect();
    assert_eq!(ids, vec!["T1", "T2", "T3"]);

    let first = &loaded[0];
    assert_eq!(first.unit_price, dec!(58.4125));
    assert_eq!(first.amount, dec!(-700.95));
    assert_eq!(first.fee, dec!(1.99));
    assert_eq!(first.kind, TransactionKind::Buy);
    assert_eq!(first.symbol.as_deref(), Some("FR0000120271"));
    assert_eq!(first.executed_at, at(2, 9));
}

#[tokio::test]
async fn store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sync.db");
    {
        let store = SqliteStore::new(&path).await.unwrap();
        store
            .save_account(&account("tr-1", PlatformType::TradeRepublic))
            .await
            .unwrap();
    }

    let reopened = SqliteStore::new(&path).await.unwrap();
    assert_eq!(reopened.find_all().await.unwrap().len(), 1);
}
