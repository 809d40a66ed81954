use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub client_id: String,
    pub message: String,
    /// Accepted for client compatibility, conversations are not stored.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChatUsage {
    pub messages: u64,
    pub tokens: u64,
    /// `null` for plans without a cap.
    pub limit: Option<u64>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ChatResponse {
    pub reply: String,
    pub usage: ChatUsage,
}
