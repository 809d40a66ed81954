use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
};
use db::UsageStore;

use crate::services::{self, provider::BillingProvider};

/// Handles Stripe webhook events that grant or revoke plans.
///
/// # Input
/// - `payload`: raw request body, verified byte for byte
/// - `req`: HTTP request carrying the `stripe-signature` header
///
/// # Output
/// - Success: `{"ok": true}`, including for event types that are ignored
/// - Error: `400 Bad Request` for a missing or invalid signature and for
///   malformed payloads, nothing is written in that case
///
/// # Note
/// Called by Stripe's servers, not by the frontend. Subscribe the endpoint
/// to `checkout.session.completed`, `invoice.paid` and
/// `customer.subscription.deleted`, and set its signing secret as
/// `STRIPE_WEBHOOK_SECRET`.
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    store: web::Data<dyn UsageStore>,
    billing: web::Data<dyn BillingProvider>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event =
        services::webhook::construct_event(&payload, signature, &config.stripe_webhook_secret)?;
    services::webhook::process_event(store.get_ref(), billing.get_ref(), event).await?;

    Success::ok(serde_json::json!({ "ok": true }))
}
