use actix_web::web;

pub mod routes {
    pub mod chat;
}

pub mod services {
    pub mod chat;
    pub mod openai;
    pub mod provider;
}

pub mod dtos {
    pub mod chat;
}

pub mod models {
    pub mod completion;
}

pub mod misc {
    pub mod prompt;
}

pub use misc::prompt::PromptTable;
pub use services::{openai::OpenAiClient, provider::CompletionProvider};

pub fn mount_chat() -> actix_web::Scope {
    web::scope("/chat").service(routes::chat::post_chat)
}
