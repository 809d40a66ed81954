use common::{
    error::{AppError, Res},
    plan::Plan,
};
use sqlx::{Executor, Postgres};

pub async fn ensure_account<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
) -> Res<()> {
    sqlx::query("INSERT INTO accounts (client_id) VALUES ($1) ON CONFLICT (client_id) DO NOTHING")
        .bind(client_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn get_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
) -> Res<Option<Plan>> {
    sqlx::query_scalar::<_, String>("SELECT plan FROM accounts WHERE client_id = $1")
        .bind(client_id)
        .fetch_optional(executor)
        .await
        .map(|plan| plan.map(|p| Plan::from_stored(&p)))
        .map_err(AppError::from)
}

pub async fn upsert_plan<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
    plan: Plan,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO accounts (client_id, plan)
        VALUES ($1, $2)
        ON CONFLICT (client_id)
        DO UPDATE SET plan = EXCLUDED.plan, updated_at = NOW()
        "#,
    )
    .bind(client_id)
    .bind(plan.as_str())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn upsert_stripe_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
    customer_id: &str,
) -> Res<()> {
    sqlx::query(
        r#"
        INSERT INTO accounts (client_id, stripe_customer_id)
        VALUES ($1, $2)
        ON CONFLICT (client_id)
        DO UPDATE SET stripe_customer_id = EXCLUDED.stripe_customer_id, updated_at = NOW()
        "#,
    )
    .bind(client_id)
    .bind(customer_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_stripe_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    client_id: &str,
) -> Res<Option<String>> {
    sqlx::query_scalar::<_, Option<String>>(
        "SELECT stripe_customer_id FROM accounts WHERE client_id = $1",
    )
    .bind(client_id)
    .fetch_optional(executor)
    .await
    .map(Option::flatten)
    .map_err(AppError::from)
}

pub async fn find_client_by_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    customer_id: &str,
) -> Res<Option<String>> {
    sqlx::query_scalar::<_, String>(
        r#"
        SELECT client_id FROM accounts
        WHERE stripe_customer_id = $1
        ORDER BY updated_at DESC
        LIMIT 1
        "#,
    )
    .bind(customer_id)
    .fetch_optional(executor)
    .await
    .map_err(AppError::from)
}
