use std::sync::Arc;

use actix_web::{Responder, post, web};
use common::{env_config::Config, error::Res, http::Success};
use db::UsageStore;

use crate::{
    dtos::chat::ChatRequest, misc::prompt::PromptTable, services,
    services::provider::CompletionProvider,
};

/// Forwards a message to the language model with the client's system prompt.
///
/// # Input
/// - `client_id`: client the message is billed to, also selects the system prompt
/// - `message`: user message
/// - `session_id`: optional, ignored
///
/// # Output
/// - Success: `{"reply": "...", "usage": {"messages": n, "tokens": n, "limit": n | null}}`
/// - Error: `400` for empty fields, `402` once the monthly quota is used up,
///   `500` when the provider fails
#[post("")]
pub async fn post_chat(
    req: web::Json<ChatRequest>,
    config: web::Data<Arc<Config>>,
    store: web::Data<dyn UsageStore>,
    provider: web::Data<dyn CompletionProvider>,
    prompts: web::Data<PromptTable>,
) -> Res<impl Responder> {
    let response = services::chat::chat(
        store.get_ref(),
        provider.get_ref(),
        &prompts,
        &config.plan_limits,
        req.into_inner(),
    )
    .await?;

    Success::ok(response)
}
