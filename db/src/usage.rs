use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};

use crate::store::UsageSnapshot;

pub async fn get_usage<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
    period: &str,
) -> Res<UsageSnapshot> {
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT messages_used, tokens_used FROM usage_counters
        WHERE client_id = $1 AND period = $2
        "#,
    )
    .bind(client_id)
    .bind(period)
    .fetch_optional(executor)
    .await
    .map(|row| {
        row.map(|(messages, tokens)| UsageSnapshot {
            messages_used: messages.max(0) as u64,
            tokens_used: tokens.max(0) as u64,
        })
        .unwrap_or_default()
    })
    .map_err(AppError::from)
}

/// Single-statement increment, concurrent callers never lose an update.
pub async fn increment<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
    period: &str,
    tokens: u64,
) -> Res<()> {
    let tokens = i64::try_from(tokens)
        .map_err(|_| AppError::Internal(format!("Token count out of range: {}", tokens)))?;

    sqlx::query(
        r#"
        INSERT INTO usage_counters (client_id, period, messages_used, tokens_used)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (client_id, period)
        DO UPDATE SET
            messages_used = usage_counters.messages_used + 1,
            tokens_used = usage_counters.tokens_used + EXCLUDED.tokens_used,
            updated_at = NOW()
        "#,
    )
    .bind(client_id)
    .bind(period)
    .bind(tokens)
    .execute(executor)
    .await?;
    Ok(())
}
