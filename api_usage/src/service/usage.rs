use common::{error::Res, plan::PlanLimits};
use db::UsageStore;

use crate::dtos::usage::UsageResponse;

/// Usage of the current billing period next to the client's quota.
pub async fn get_usage_report(
    store: &dyn UsageStore,
    limits: &PlanLimits,
    client_id: &str,
) -> Res<UsageResponse> {
    let quota = limiter::check_quota(store, limits, client_id).await?;
    log::debug!(
        "Usage report for {}: {} messages, {} tokens",
        client_id,
        quota.usage.messages_used,
        quota.usage.tokens_used
    );

    Ok(UsageResponse {
        client_id: client_id.to_string(),
        messages: quota.usage.messages_used,
        tokens_used: quota.usage.tokens_used,
        limit: quota.limit,
    })
}
