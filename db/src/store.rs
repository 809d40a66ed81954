use async_trait::async_trait;
use common::{error::Res, plan::Plan};

/// Message and token counters of one client for one billing period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageSnapshot {
    pub messages_used: u64,
    pub tokens_used: u64,
}

/// Storage of per-client usage counters, plan and Stripe customer id.
///
/// Counters belong to the current billing period; a client that has not
/// been seen in the period reads as zero.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Counters of the current period, zero when nothing was recorded.
    async fn get_usage(&self, client_id: &str) -> Res<UsageSnapshot>;

    /// Adds one message and `tokens` tokens to the current period in a single atomic step.
    /// The account is created on first use.
    async fn log_usage(&self, client_id: &str, tokens: u64) -> Res<()>;

    async fn get_plan(&self, client_id: &str) -> Res<Option<Plan>>;

    async fn set_plan(&self, client_id: &str, plan: Plan) -> Res<()>;

    async fn set_stripe_customer_id(&self, client_id: &str, customer_id: &str) -> Res<()>;

    async fn get_stripe_customer_id(&self, client_id: &str) -> Res<Option<String>>;

    /// Reverse lookup of the client a Stripe customer was associated with.
    async fn find_client_by_customer_id(&self, customer_id: &str) -> Res<Option<String>>;
}
