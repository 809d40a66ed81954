use async_trait::async_trait;
use common::{error::Res, misc::current_billing_period, plan::Plan};
use dashmap::DashMap;

use crate::store::{UsageSnapshot, UsageStore};

/// New accounts start on basic, like the `plan` column default.
#[derive(Debug, Default)]
struct AccountEntry {
    plan: Plan,
    stripe_customer_id: Option<String>,
}

/// Process-local store used when no database is configured.
///
/// Each counter update happens under the DashMap shard lock of its key, so
/// concurrent increments of the same client are serialized.
#[derive(Debug, Default)]
pub struct MemoryUsageStore {
    accounts: DashMap<String, AccountEntry>,
    usage: DashMap<(String, String), UsageSnapshot>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn get_usage(&self, client_id: &str) -> Res<UsageSnapshot> {
        let key = (client_id.to_string(), current_billing_period());
        Ok(self.usage.get(&key).map(|entry| *entry).unwrap_or_default())
    }

    async fn log_usage(&self, client_id: &str, tokens: u64) -> Res<()> {
        self.accounts.entry(client_id.to_string()).or_default();

        let mut entry = self
            .usage
            .entry((client_id.to_string(), current_billing_period()))
            .or_default();
        entry.messages_used += 1;
        entry.tokens_used += tokens;
        Ok(())
    }

    async fn get_plan(&self, client_id: &str) -> Res<Option<Plan>> {
        Ok(self.accounts.get(client_id).map(|entry| entry.plan))
    }

    async fn set_plan(&self, client_id: &str, plan: Plan) -> Res<()> {
        self.accounts.entry(client_id.to_string()).or_default().plan = plan;
        Ok(())
    }

    async fn set_stripe_customer_id(&self, client_id: &str, customer_id: &str) -> Res<()> {
        self.accounts
            .entry(client_id.to_string())
            .or_default()
            .stripe_customer_id = Some(customer_id.to_string());
        Ok(())
    }

    async fn get_stripe_customer_id(&self, client_id: &str) -> Res<Option<String>> {
        Ok(self
            .accounts
            .get(client_id)
            .and_then(|entry| entry.stripe_customer_id.clone()))
    }

    async fn find_client_by_customer_id(&self, customer_id: &str) -> Res<Option<String>> {
        Ok(self
            .accounts
            .iter()
            .find(|entry| entry.stripe_customer_id.as_deref() == Some(customer_id))
            .map(|entry| entry.key().clone()))
    }
}
