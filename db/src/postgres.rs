use std::sync::Arc;

use async_trait::async_trait;
use common::{error::Res, misc::current_billing_period, plan::Plan};
use sqlx::PgPool;

use crate::{
    account,
    store::{UsageSnapshot, UsageStore},
    usage,
};

pub struct PgUsageStore {
    pool: Arc<PgPool>,
}

impl PgUsageStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UsageStore for PgUsageStore {
    async fn get_usage(&self, client_id: &str) -> Res<UsageSnapshot> {
        usage::get_usage(&*self.pool, client_id, &current_billing_period()).await
    }

    async fn log_usage(&self, client_id: &str, tokens: u64) -> Res<()> {
        let mut tx = self.pool.begin().await?;
        account::ensure_account(&mut *tx, client_id).await?;
        usage::increment(&mut *tx, client_id, &current_billing_period(), tokens).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn get_plan(&self, client_id: &str) -> Res<Option<Plan>> {
        account::get_plan(&*self.pool, client_id).await
    }

    async fn set_plan(&self, client_id: &str, plan: Plan) -> Res<()> {
        account::upsert_plan(&*self.pool, client_id, plan).await
    }

    async fn set_stripe_customer_id(&self, client_id: &str, customer_id: &str) -> Res<()> {
        account::upsert_stripe_customer_id(&*self.pool, client_id, customer_id).await
    }

    async fn get_stripe_customer_id(&self, client_id: &str) -> Res<Option<String>> {
        account::get_stripe_customer_id(&*self.pool, client_id).await
    }

    async fn find_client_by_customer_id(&self, customer_id: &str) -> Res<Option<String>> {
        account::find_client_by_customer_id(&*self.pool, customer_id).await
    }
}
