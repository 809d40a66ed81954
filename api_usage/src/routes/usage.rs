use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{env_config::Config, error::Res, http::Success};
use db::UsageStore;

use crate::service;

/// Retrieves the current month's usage of a client.
///
/// # Returns
///
/// `{"client_id": "...", "messages": n, "tokens_used": n, "limit": n | null}`,
/// zero counters for clients that have not chatted this month.
#[get("/{client_id}")]
pub async fn get_usage(
    path: web::Path<String>,
    config: web::Data<Arc<Config>>,
    store: web::Data<dyn UsageStore>,
) -> Res<impl Responder> {
    let client_id = path.into_inner();
    let report =
        service::usage::get_usage_report(store.get_ref(), &config.plan_limits, &client_id).await?;
    Success::ok(report)
}
