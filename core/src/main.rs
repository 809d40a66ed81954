use std::sync::Arc;

use actix_web::{App, HttpServer};
use api_chat::{OpenAiClient, PromptTable};
use api_subs::StripeBillingProvider;
use common::env_config::Config;
use db::{MemoryUsageStore, PgUsageStore, UsageStore};
use server::{AppData, cors};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // get env vars
    let config = Config::from_env();

    // init logger
    logger::setup(&config.log_file).expect("Failed to set up logger");

    // init usage store
    let pool = db::connect(&config)
        .await
        .expect("Failed to set up database");
    let store: Arc<dyn UsageStore> = match pool {
        Some(pool) => Arc::new(PgUsageStore::new(pool)),
        None => {
            log::warn!("DATABASE_URL not set, usage and plans are kept in memory only");
            Arc::new(MemoryUsageStore::new())
        }
    };

    if config.stripe_webhook_secret.is_empty() {
        log::warn!("STRIPE_WEBHOOK_SECRET not set, every webhook will be rejected");
    }

    // external providers
    let completion = OpenAiClient::new(&config.openai).expect("Failed to set up completion client");
    let client = common::stripe::create_client(&config.stripe_secret_key);
    let billing = StripeBillingProvider::new(client);

    let prompts =
        PromptTable::load(config.prompts_path.as_deref()).expect("Failed to load prompts");

    let data = AppData::new(
        config.clone(),
        store,
        Arc::new(completion),
        Arc::new(billing),
        prompts,
    );

    log::info!(
        "Listening on {}:{} ({} environment)",
        config.server_host,
        config.server_port,
        config.environment
    );

    let console_logging_enabled = config.console_logging_enabled;
    HttpServer::new(move || {
        let data = data.clone();
        App::new()
            .wrap(logger::middleware(console_logging_enabled)) // 2nd
            .wrap(cors::middleware()) // 1st
            .configure(move |cfg| data.configure(cfg))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .workers(config.num_workers)
    .run()
    .await
}
