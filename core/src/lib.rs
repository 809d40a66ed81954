use std::sync::Arc;

use actix_web::{Responder, get, web};
use api_chat::{CompletionProvider, PromptTable};
use api_subs::BillingProvider;
use common::{env_config::Config, error::Res, http::Success};
use db::UsageStore;

pub mod cors;

/// Shared state handed to every worker. Each field is an `Arc` underneath,
/// so cloning per worker is cheap and all workers see the same store.
#[derive(Clone)]
pub struct AppData {
    pub config: web::Data<Arc<Config>>,
    pub store: web::Data<dyn UsageStore>,
    pub completion: web::Data<dyn CompletionProvider>,
    pub billing: web::Data<dyn BillingProvider>,
    pub prompts: web::Data<PromptTable>,
}

impl AppData {
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn UsageStore>,
        completion: Arc<dyn CompletionProvider>,
        billing: Arc<dyn BillingProvider>,
        prompts: PromptTable,
    ) -> Self {
        AppData {
            config: web::Data::new(config),
            store: web::Data::from(store),
            completion: web::Data::from(completion),
            billing: web::Data::from(billing),
            prompts: web::Data::new(prompts),
        }
    }

    /// Registers the shared state and every route of the gateway.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.store.clone())
            .app_data(self.completion.clone())
            .app_data(self.billing.clone())
            .app_data(self.prompts.clone())
            .service(health)
            .service(api_chat::mount_chat())
            .service(api_usage::mount_usage())
            .service(api_subs::mount_billing())
            .service(api_subs::mount_webhook());
    }
}

#[get("/")]
async fn health() -> Res<impl Responder> {
    Success::ok(serde_json::json!({ "ok": true }))
}
