use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{env_config::Config, error::Res, http::Success};

use crate::{dtos::checkout::CheckoutQuery, services};

/// Redirects a client to the payment link of the requested plan.
///
/// # Input
/// - `client_id`: client the subscription is bought for, forwarded as the
///   prefilled payer email when it looks like one
/// - `plan`: `basic`, `pro` or `illimite`
///
/// # Output
/// - Success: `303 See Other` with the payment link in `Location`
/// - Error: `400 Bad Request` for an unknown or unconfigured plan
#[get("/checkout")]
pub async fn get_checkout(
    query: web::Query<CheckoutQuery>,
    config: web::Data<Arc<Config>>,
) -> Res<impl Responder> {
    let url =
        services::checkout::checkout_url(&config.checkout_links, &query.client_id, &query.plan)?;
    log::info!("Redirecting {} to {} checkout", query.client_id, query.plan);
    Success::see_other(url)
}
