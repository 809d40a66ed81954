use common::{error::Res, plan::PlanLimits};
use db::{UsageSnapshot, UsageStore};

/// Usage of the current period next to the quota it is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaStatus {
    pub usage: UsageSnapshot,
    /// `None` for plans without a cap.
    pub limit: Option<u64>,
}

impl QuotaStatus {
    /// True once a capped plan has used all of its messages.
    pub fn is_exhausted(&self) -> bool {
        match self.limit {
            Some(limit) => self.usage.messages_used >= limit,
            None => false,
        }
    }
}

/// Monthly message quota of a client. Clients without a recorded plan are on basic.
pub async fn get_limit(
    store: &dyn UsageStore,
    limits: &PlanLimits,
    client_id: &str,
) -> Res<Option<u64>> {
    let plan = store.get_plan(client_id).await?.unwrap_or_default();
    Ok(limits.limit_for(plan))
}

pub async fn check_quota(
    store: &dyn UsageStore,
    limits: &PlanLimits,
    client_id: &str,
) -> Res<QuotaStatus> {
    let usage = store.get_usage(client_id).await?;
    let limit = get_limit(store, limits, client_id).await?;

    log::debug!(
        "Quota for {}: {}/{}",
        client_id,
        usage.messages_used,
        limit.map_or("unlimited".to_string(), |l| l.to_string())
    );

    Ok(QuotaStatus { usage, limit })
}
