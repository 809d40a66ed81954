use common::{error::Res, plan::Plan};
use db::UsageStore;

use crate::{
    misc::{plan::infer_plan, signature},
    models::event::{PaymentEvent, Purchase},
    services::provider::BillingProvider,
};

/// Verifies the signature of a webhook delivery and decodes it.
/// Nothing is decoded, let alone applied, when verification fails.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<PaymentEvent> {
    let now = chrono::Utc::now().timestamp();
    signature::verify_signature(payload, signature, webhook_secret, now)?;
    PaymentEvent::from_payload(payload)
}

/// Applies a verified event to the store.
///
/// Setting a plan is last-write-wins, so redelivered events are harmless.
pub async fn process_event(
    store: &dyn UsageStore,
    billing: &dyn BillingProvider,
    event: PaymentEvent,
) -> Res<()> {
    match event {
        PaymentEvent::CheckoutCompleted(purchase) | PaymentEvent::InvoicePaid(purchase) => {
            activate_plan(store, billing, purchase).await
        }
        PaymentEvent::SubscriptionDeleted { customer_id } => {
            downgrade_plan(store, billing, customer_id).await
        }
        PaymentEvent::Other(type_) => {
            log::info!("Unhandled event type: {}", type_);
            Ok(())
        }
    }
}

async fn activate_plan(
    store: &dyn UsageStore,
    billing: &dyn BillingProvider,
    purchase: Purchase,
) -> Res<()> {
    let Some(email) = purchase.email.as_deref() else {
        log::warn!(
            "Payment without payer email (customer {:?}), plan left unchanged",
            purchase.customer_id
        );
        return Ok(());
    };

    if let Some(customer_id) = purchase.customer_id.as_deref() {
        store.set_stripe_customer_id(email, customer_id).await?;
    }

    let plan = match resolve_purchased_plan(billing, &purchase).await {
        Ok(Some(plan)) => plan,
        Ok(None) => {
            log::warn!("Could not infer purchased plan for {}, keeping current plan", email);
            store.get_plan(email).await?.unwrap_or_default()
        }
        Err(e) => {
            log::warn!("Plan inference failed for {}: {}, keeping current plan", email, e);
            store.get_plan(email).await?.unwrap_or_default()
        }
    };

    store.set_plan(email, plan).await?;
    log::info!("Plan of {} set to {}", email, plan);
    Ok(())
}

/// Explicit metadata first, then names in the payload, then names fetched from Stripe.
async fn resolve_purchased_plan(
    billing: &dyn BillingProvider,
    purchase: &Purchase,
) -> Res<Option<Plan>> {
    if let Some(hint) = purchase.plan_hint.as_deref() {
        match hint.parse::<Plan>() {
            Ok(plan) => return Ok(Some(plan)),
            Err(_) => log::warn!("Ignoring unknown plan metadata '{}'", hint),
        }
    }

    if let Some(plan) = infer_plan(purchase.product_names.iter().map(String::as_str)) {
        return Ok(Some(plan));
    }

    if let Some(session_id) = purchase.checkout_session_id.as_deref() {
        let names = billing.checkout_line_item_names(session_id).await?;
        if let Some(plan) = infer_plan(names.iter().map(String::as_str)) {
            return Ok(Some(plan));
        }
    }

    for product_id in &purchase.product_ids {
        if let Some(name) = billing.product_name(product_id).await? {
            if let Some(plan) = infer_plan([name.as_str()]) {
                return Ok(Some(plan));
            }
        }
    }

    Ok(None)
}

async fn downgrade_plan(
    store: &dyn UsageStore,
    billing: &dyn BillingProvider,
    customer_id: Option<String>,
) -> Res<()> {
    let Some(customer_id) = customer_id else {
        log::warn!("Subscription deleted without customer id, downgrade dropped");
        return Ok(());
    };

    let client_id = match store.find_client_by_customer_id(&customer_id).await? {
        Some(client_id) => Some(client_id),
        None => billing.customer_client_id(&customer_id).await?,
    };

    match client_id {
        Some(client_id) => {
            store.set_plan(&client_id, Plan::Basic).await?;
            log::info!("Subscription of {} ended, plan set to basic", client_id);
        }
        None => log::warn!(
            "Could not resolve a client for customer {}, downgrade dropped",
            customer_id
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use common::error::AppError;
    use db::MemoryUsageStore;

    use super::*;

    #[derive(Default)]
    struct FakeBilling {
        line_items: HashMap<String, Vec<String>>,
        products: HashMap<String, String>,
        customers: HashMap<String, String>,
        fail_lookups: bool,
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl BillingProvider for FakeBilling {
        async fn checkout_line_item_names(&self, session_id: &str) -> Res<Vec<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups {
                return Err(AppError::Internal("stripe unreachable".into()));
            }
            Ok(self.line_items.get(session_id).cloned().unwrap_or_default())
        }

        async fn product_name(&self, product_id: &str) -> Res<Option<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.get(product_id).cloned())
        }

        async fn customer_client_id(&self, customer_id: &str) -> Res<Option<String>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.customers.get(customer_id).cloned())
        }
    }

    fn checkout(email: Option<&str>, customer: Option<&str>, session: &str) -> PaymentEvent {
        PaymentEvent::CheckoutCompleted(Purchase {
            email: email.map(String::from),
            customer_id: customer.map(String::from),
            checkout_session_id: Some(session.to_string()),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn checkout_then_cancellation() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling {
            line_items: HashMap::from([("cs_1".to_string(), vec!["Pro Plan".to_string()])]),
            ..Default::default()
        };

        process_event(&store, &billing, checkout(Some("a@x.com"), Some("cus_1"), "cs_1"))
            .await
            .unwrap();
        assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Pro));
        assert_eq!(
            store.get_stripe_customer_id("a@x.com").await.unwrap().as_deref(),
            Some("cus_1")
        );

        let deleted = PaymentEvent::SubscriptionDeleted {
            customer_id: Some("cus_1".into()),
        };
        process_event(&store, &billing, deleted).await.unwrap();
        assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Basic));
    }

    #[tokio::test]
    async fn redelivery_is_idempotent() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling {
            line_items: HashMap::from([("cs_1".to_string(), vec!["Offre Illimitée".to_string()])]),
            ..Default::default()
        };

        for _ in 0..2 {
            process_event(&store, &billing, checkout(Some("a@x.com"), None, "cs_1"))
                .await
                .unwrap();
        }
        assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Illimite));
        assert_eq!(billing.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_email_is_a_no_op() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling::default();

        process_event(&store, &billing, checkout(None, Some("cus_1"), "cs_1"))
            .await
            .unwrap();

        assert_eq!(store.find_client_by_customer_id("cus_1").await.unwrap(), None);
        assert_eq!(billing.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn metadata_plan_wins_without_lookup() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling::default();

        let event = PaymentEvent::CheckoutCompleted(Purchase {
            email: Some("a@x.com".into()),
            plan_hint: Some("illimite".into()),
            checkout_session_id: Some("cs_1".into()),
            ..Default::default()
        });
        process_event(&store, &billing, event).await.unwrap();

        assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Illimite));
        assert_eq!(billing.lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_inference_keeps_existing_plan() {
        let store = MemoryUsageStore::new();
        store.set_plan("a@x.com", Plan::Pro).await.unwrap();
        let billing = FakeBilling {
            fail_lookups: true,
            ..Default::default()
        };

        process_event(&store, &billing, checkout(Some("a@x.com"), Some("cus_7"), "cs_1"))
            .await
            .unwrap();

        assert_eq!(store.get_plan("a@x.com").await.unwrap(), Some(Plan::Pro));
        // the customer association still happens
        assert_eq!(
            store.find_client_by_customer_id("cus_7").await.unwrap().as_deref(),
            Some("a@x.com")
        );
    }

    #[tokio::test]
    async fn undetermined_plan_defaults_to_basic() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling {
            line_items: HashMap::from([("cs_1".to_string(), vec!["Gift card".to_string()])]),
            ..Default::default()
        };

        process_event(&store, &billing, checkout(Some("new@x.com"), None, "cs_1"))
            .await
            .unwrap();

        assert_eq!(store.get_plan("new@x.com").await.unwrap(), Some(Plan::Basic));
    }

    #[tokio::test]
    async fn invoice_uses_line_descriptions_then_products() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling {
            products: HashMap::from([("prod_1".to_string(), "Plan Pro".to_string())]),
            ..Default::default()
        };

        let event = PaymentEvent::InvoicePaid(Purchase {
            email: Some("b@x.com".into()),
            product_names: vec!["Subscription update".into()],
            product_ids: vec!["prod_1".into()],
            ..Default::default()
        });
        process_event(&store, &billing, event).await.unwrap();

        assert_eq!(store.get_plan("b@x.com").await.unwrap(), Some(Plan::Pro));
    }

    #[tokio::test]
    async fn cancellation_resolves_customer_through_stripe() {
        let store = MemoryUsageStore::new();
        store.set_plan("c@x.com", Plan::Illimite).await.unwrap();
        let billing = FakeBilling {
            customers: HashMap::from([("cus_2".to_string(), "c@x.com".to_string())]),
            ..Default::default()
        };

        let event = PaymentEvent::SubscriptionDeleted {
            customer_id: Some("cus_2".into()),
        };
        process_event(&store, &billing, event).await.unwrap();

        assert_eq!(store.get_plan("c@x.com").await.unwrap(), Some(Plan::Basic));
    }

    #[tokio::test]
    async fn unresolved_cancellation_is_dropped() {
        let store = MemoryUsageStore::new();
        store.set_plan("c@x.com", Plan::Pro).await.unwrap();
        let billing = FakeBilling::default();

        let event = PaymentEvent::SubscriptionDeleted {
            customer_id: Some("cus_unknown".into()),
        };
        process_event(&store, &billing, event).await.unwrap();

        assert_eq!(store.get_plan("c@x.com").await.unwrap(), Some(Plan::Pro));
    }

    #[tokio::test]
    async fn other_events_change_nothing() {
        let store = MemoryUsageStore::new();
        let billing = FakeBilling::default();

        process_event(&store, &billing, PaymentEvent::Other("charge.refunded".into()))
            .await
            .unwrap();

        assert_eq!(store.get_plan("a@x.com").await.unwrap(), None);
        assert_eq!(billing.lookups.load(Ordering::SeqCst), 0);
    }
}
