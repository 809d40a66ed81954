use common::{
    env_config::CheckoutLinks,
    error::{AppError, Res},
    misc::looks_like_email,
    plan::Plan,
};
use url::Url;

/// Payment link a client is redirected to for `plan`.
///
/// Email-like client ids are forwarded as `prefilled_email` so the payer
/// email on the resulting checkout matches the client id.
pub fn checkout_url(links: &CheckoutLinks, client_id: &str, plan: &str) -> Res<String> {
    let plan: Plan = plan.parse()?;

    let link = links.link_for(plan).ok_or_else(|| {
        AppError::BadRequest(format!("No checkout link configured for plan {}", plan))
    })?;

    let mut url = Url::parse(link).map_err(|e| {
        AppError::Internal(format!("Invalid checkout link for plan {}: {}", plan, e))
    })?;

    let client_id = client_id.trim();
    if looks_like_email(client_id) {
        url.query_pairs_mut().append_pair("prefilled_email", client_id);
    }

    Ok(url.into())
}
