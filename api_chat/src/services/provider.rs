use async_trait::async_trait;
use common::error::Res;

use crate::models::completion::{ChatMessage, Completion};

/// Chat completion backend.
///
/// Failures are reported as `AppError::Upstream` carrying the provider's error text.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Res<Completion>;
}
