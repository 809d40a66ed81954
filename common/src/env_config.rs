use std::{env, sync::Arc};

use crate::plan::{Plan, PlanLimits};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Everything the gateway needs is read once at startup and shared
/// read-only with the handlers: server binding, storage, the completion
/// provider, Stripe credentials, checkout links and plan quotas.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// Postgres connection string. When absent usage is kept in memory.
    pub database_url: Option<String>,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// File the logger mirrors console output into.
    pub log_file: String,
    /// Language-model provider settings.
    pub openai: OpenAiConfig,
    /// Stripe secret key
    pub stripe_secret_key: String,
    /// Stripe webhook secret
    pub stripe_webhook_secret: String,
    /// Static payment links, one per plan.
    pub checkout_links: CheckoutLinks,
    /// Monthly message quota per plan.
    pub plan_limits: PlanLimits,
    /// Optional JSON file with extra per-client system prompts.
    pub prompts_path: Option<String>,
}

#[derive(Clone, Debug)]
/// Settings for the OpenAI-compatible chat completion endpoint.
pub struct OpenAiConfig {
    /// Bearer token sent with every completion request.
    pub api_key: String,
    /// Base URL of the API, without the `/chat/completions` suffix.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, Default)]
pub struct CheckoutLinks {
    pub basic: String,
    pub pro: String,
    pub illimite: String,
}

impl CheckoutLinks {
    /// Payment link for `plan`, `None` when the link is not configured.
    pub fn link_for(&self, plan: Plan) -> Option<&str> {
        let link = match plan {
            Plan::Basic => &self.basic,
            Plan::Pro => &self.pro,
            Plan::Illimite => &self.illimite,
        };
        if link.is_empty() { None } else { Some(link) }
    }
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// A `.env` file is honoured when present.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `OPENAI_API_KEY`: API key of the language-model provider
    /// - `STRIPE_SECRET_KEY`: Stripe secret key
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT` (default: "development")
    /// - `DATABASE_URL` (default: none, in-memory storage)
    /// - `IP` (default: "127.0.0.1"), `PORT` (default: 8080), `WORKERS` (default: 4)
    /// - `ENABLE_CONSOLE_LOGGING` (default: true), `LOG_FILE` (default: "chat-gateway.log")
    /// - `OPENAI_BASE_URL`, `OPENAI_MODEL` (default: "gpt-4o-mini"),
    ///   `OPENAI_TEMPERATURE` (default: 0.3), `OPENAI_TIMEOUT_SECS` (default: 60)
    /// - `STRIPE_WEBHOOK_SECRET` (default: empty, every webhook is then rejected)
    /// - `STRIPE_LINK_BASIC`, `STRIPE_LINK_PRO`, `STRIPE_LINK_ILLIMITE`
    /// - `PLAN_LIMIT_BASIC` (default: 100), `PLAN_LIMIT_PRO` (default: 1000)
    /// - `PROMPTS_PATH`
    ///
    /// # Panics
    ///
    /// This function will panic if required environment variables are missing or if
    /// numeric values cannot be parsed correctly.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Config::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|value| !value.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let defaults = PlanLimits::default();

        Config {
            environment: or("ENVIRONMENT", "development"),
            database_url: var("DATABASE_URL"),
            server_host: or("IP", "127.0.0.1"),
            server_port: or("PORT", "8080").parse().unwrap_or(8080),
            num_workers: or("WORKERS", "4").parse().unwrap_or(4),
            console_logging_enabled: or("ENABLE_CONSOLE_LOGGING", "true").to_lowercase()
                == "true",
            log_file: or("LOG_FILE", "chat-gateway.log"),
            openai: OpenAiConfig {
                api_key: var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set"),
                base_url: or("OPENAI_BASE_URL", "https://api.openai.com/v1")
                    .trim_end_matches('/')
                    .to_string(),
                model: or("OPENAI_MODEL", "gpt-4o-mini"),
                temperature: or("OPENAI_TEMPERATURE", "0.3")
                    .parse()
                    .expect("OPENAI_TEMPERATURE must be a valid number"),
                timeout_secs: or("OPENAI_TIMEOUT_SECS", "60")
                    .parse()
                    .expect("OPENAI_TIMEOUT_SECS must be a valid number"),
            },
            stripe_secret_key: var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
            stripe_webhook_secret: var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            checkout_links: CheckoutLinks {
                basic: var("STRIPE_LINK_BASIC").unwrap_or_default(),
                pro: var("STRIPE_LINK_PRO").unwrap_or_default(),
                illimite: var("STRIPE_LINK_ILLIMITE").unwrap_or_default(),
            },
            plan_limits: PlanLimits {
                basic: var("PLAN_LIMIT_BASIC")
                    .map(|v| v.parse().expect("PLAN_LIMIT_BASIC must be a valid number"))
                    .or(defaults.basic),
                pro: var("PLAN_LIMIT_PRO")
                    .map(|v| v.parse().expect("PLAN_LIMIT_PRO must be a valid number"))
                    .or(defaults.pro),
                illimite: defaults.illimite,
            },
            prompts_path: var("PROMPTS_PATH"),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
