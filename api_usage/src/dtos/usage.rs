use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct UsageResponse {
    pub client_id: String,
    pub messages: u64,
    pub tokens_used: u64,
    /// `null` for plans without a cap.
    pub limit: Option<u64>,
}
