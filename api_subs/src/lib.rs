use actix_web::web::{self};

pub mod routes {
    pub mod billing;
    pub mod webhook;
}

pub mod services {
    pub mod checkout;
    pub mod provider;
    pub mod webhook;
}

mod dtos {
    pub(crate) mod checkout;
    pub(crate) mod event;
}

pub mod models {
    pub mod event;
}

pub mod misc {
    pub mod plan;
    pub mod signature;
}

pub use services::provider::{BillingProvider, StripeBillingProvider};

pub fn mount_billing() -> actix_web::Scope {
    web::scope("/billing").service(routes::billing::get_checkout)
}
pub fn mount_webhook() -> actix_web::Scope {
    web::scope("/stripe").service(routes::webhook::post_webhook)
}
