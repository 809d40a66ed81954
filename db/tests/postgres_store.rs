use std::sync::Arc;

use common::plan::Plan;
use db::{PgUsageStore, UsageStore};
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn usage_and_plan_round_trip(pool: PgPool) {
    let store = PgUsageStore::new(Arc::new(pool));

    let empty = store.get_usage("a@x.com").await.unwrap();
    assert_eq!((empty.messages_used, empty.tokens_used), (0, 0));

    store.log_usage("a@x.com", 12).await.unwrap();
    store.log_usage("a@x.com", 30).await.unwrap();
    let usage = store.get_usage("a@x.com").await.unwrap();
    assert_eq!((usage.messages_used, usage.tokens_used), (2, 42));

    assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Basic));
    store.set_plan("a@x.com", Plan::Illimite).await.unwrap();
    assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Illimite));

    store.set_stripe_customer_id("a@x.com", "cus_42").await.unwrap();
    assert_eq!(
        store.find_client_by_customer_id("cus_42").await.unwrap().as_deref(),
        Some("a@x.com")
    );
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL with Postgres server"]
async fn concurrent_increments_are_not_lost(pool: PgPool) {
    let store = Arc::new(PgUsageStore::new(Arc::new(pool)));

    let handles: Vec<_> = (0..32u64)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.log_usage("busy@x.com", 5).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let usage = store.get_usage("busy@x.com").await.unwrap();
    assert_eq!((usage.messages_used, usage.tokens_used), (32, 160));
}
