use common::{
    error::{AppError, Res},
    plan::PlanLimits,
};
use db::UsageStore;

use crate::{
    dtos::chat::{ChatRequest, ChatResponse, ChatUsage},
    misc::prompt::PromptTable,
    models::completion::ChatMessage,
    services::provider::CompletionProvider,
};

/// Answers one chat message on behalf of a client.
///
/// The quota is checked before the provider is called and usage is only
/// recorded once a reply came back. The returned usage is computed from the
/// counters read before logging, it is not read back from the store.
pub async fn chat(
    store: &dyn UsageStore,
    provider: &dyn CompletionProvider,
    prompts: &PromptTable,
    limits: &PlanLimits,
    req: ChatRequest,
) -> Res<ChatResponse> {
    if req.client_id.trim().is_empty() {
        return Err(AppError::BadRequest("client_id must not be empty".to_string()));
    }
    if req.message.trim().is_empty() {
        return Err(AppError::BadRequest("message must not be empty".to_string()));
    }

    let quota = limiter::check_quota(store, limits, &req.client_id).await?;
    if quota.is_exhausted() {
        log::info!(
            "Quota reached for {}: {} messages",
            req.client_id,
            quota.usage.messages_used
        );
        return Err(AppError::PaymentRequired(format!(
            "monthly quota of {} messages reached, upgrade your plan",
            quota.limit.unwrap_or_default()
        )));
    }

    let messages = [
        ChatMessage::system(prompts.system_prompt(&req.client_id)),
        ChatMessage::user(req.message),
    ];
    let completion = provider.complete(&messages).await?;

    store
        .log_usage(&req.client_id, completion.total_tokens)
        .await?;

    Ok(ChatResponse {
        reply: completion.reply,
        usage: ChatUsage {
            messages: quota.usage.messages_used + 1,
            tokens: quota.usage.tokens_used + completion.total_tokens,
            limit: quota.limit,
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use common::plan::Plan;
    use db::{MemoryUsageStore, UsageSnapshot};

    use super::*;
    use crate::models::completion::{Completion, Role};

    struct FakeProvider {
        tokens: u64,
        fail: bool,
        seen: Mutex<Vec<ChatMessage>>,
    }

    impl FakeProvider {
        fn new(tokens: u64) -> Self {
            FakeProvider {
                tokens,
                fail: false,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len() / 2
        }
    }

    #[async_trait]
    impl CompletionProvider for FakeProvider {
        async fn complete(&self, messages: &[ChatMessage]) -> Res<Completion> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            if self.fail {
                return Err(AppError::Upstream("429 Rate limit reached".to_string()));
            }
            Ok(Completion {
                reply: "Bonjour".to_string(),
                total_tokens: self.tokens,
            })
        }
    }

    fn request(client_id: &str, message: &str) -> ChatRequest {
        ChatRequest {
            client_id: client_id.to_string(),
            message: message.to_string(),
            session_id: None,
        }
    }

    fn limits() -> PlanLimits {
        PlanLimits {
            basic: Some(2),
            pro: Some(10),
            illimite: None,
        }
    }

    #[tokio::test]
    async fn replies_and_records_usage() {
        let store = MemoryUsageStore::new();
        let provider = FakeProvider::new(42);
        let prompts = PromptTable::default();

        let response = chat(&store, &provider, &prompts, &limits(), request("innerskin", "Prix ?"))
            .await
            .unwrap();

        assert_eq!(
            response,
            ChatResponse {
                reply: "Bonjour".into(),
                usage: ChatUsage {
                    messages: 1,
                    tokens: 42,
                    limit: Some(2)
                }
            }
        );
        assert_eq!(
            store.get_usage("innerskin").await.unwrap(),
            UsageSnapshot {
                messages_used: 1,
                tokens_used: 42
            }
        );

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].role, Role::System);
        assert!(seen[0].content.contains("Innerskin"));
        assert_eq!(seen[1], ChatMessage::user("Prix ?"));
    }

    #[tokio::test]
    async fn exhausted_quota_is_payment_required() {
        let store = MemoryUsageStore::new();
        let provider = FakeProvider::new(10);
        let prompts = PromptTable::default();

        for _ in 0..2 {
            chat(&store, &provider, &prompts, &limits(), request("a@x.com", "hi"))
                .await
                .unwrap();
        }
        let result = chat(&store, &provider, &prompts, &limits(), request("a@x.com", "hi")).await;

        assert!(matches!(result, Err(AppError::PaymentRequired(_))));
        assert_eq!(provider.calls(), 2);
        assert_eq!(store.get_usage("a@x.com").await.unwrap().tokens_used, 20);
    }

    #[tokio::test]
    async fn unlimited_plan_reports_null_limit() {
        let store = MemoryUsageStore::new();
        store.set_plan("a@x.com", Plan::Illimite).await.unwrap();
        let provider = FakeProvider::new(0);

        let response = chat(
            &store,
            &provider,
            &PromptTable::default(),
            &limits(),
            request("a@x.com", "hi"),
        )
        .await
        .unwrap();

        assert_eq!(response.usage.limit, None);
        assert_eq!(response.usage.tokens, 0);
    }

    #[tokio::test]
    async fn provider_failure_records_nothing() {
        let store = MemoryUsageStore::new();
        let provider = FakeProvider {
            fail: true,
            ..FakeProvider::new(10)
        };

        let result = chat(
            &store,
            &provider,
            &PromptTable::default(),
            &limits(),
            request("a@x.com", "hi"),
        )
        .await;

        assert!(matches!(result, Err(AppError::Upstream(_))));
        assert_eq!(store.get_usage("a@x.com").await.unwrap(), UsageSnapshot::default());
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_anything_else() {
        let store = MemoryUsageStore::new();
        let provider = FakeProvider::new(10);
        let prompts = PromptTable::default();

        for req in [request("", "hi"), request("a@x.com", "   ")] {
            let result = chat(&store, &provider, &prompts, &limits(), req).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
        assert_eq!(provider.calls(), 0);
    }
}
