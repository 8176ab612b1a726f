//! Bourse Direct live tests
//!
//! Run with:
//! ```bash
//! BOURSEDIRECT_USERNAME=xxx BOURSEDIRECT_PASSWORD=xxx \
//!     cargo test -p portfolio-sync-scraper --test boursedirect_test -- --ignored --nocapture
//! ```

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

mod common;

use chrono::{Duration, Utc};
use common::TestContext;

#[tokio::test]
#[ignore]
async fn test_boursedirect_full_fetch() {
    skip_if_no_credentials!("BOURSEDIRECT_USERNAME", "BOURSEDIRECT_PASSWORD");

    let Some(ctx) = TestContext::boursedirect() else {
        panic!("could not build test context");
    };
    let txs = require_ok!(ctx.scraper.fetch_transactions(&ctx.credentials, None).await);
    assert!(txs.windows(2).all(|w| w[0].executed_at <= w[1].executed_at));
    println!("✓ fetched {} operations", txs.len());
}

#[tokio::test]
#[ignore]
async fn test_boursedirect_incremental_includes_checkpoint_day() {
    skip_if_no_credentials!("BOURSEDIRECT_USERNAME", "BOURSEDIRECT_PASSWORD");

    let Some(ctx) = TestContext::boursedirect() else {
        panic!("could not build test context");
    };
    let since = Utc::now() - Duration::days(90);
    let txs = require_ok!(
        ctx.scraper
            .fetch_transactions(&ctx.credentials, Some(since))
            .await
    );
    assert!(
        txs.iter()
            .all(|t| t.executed_at.date_naive() >= since.date_naive())
    );
}
