use common::error::{AppError, Res};
use serde::de::DeserializeOwned;

use crate::dtos::event::{
    CheckoutSessionObject, ExpandableId, InvoiceObject, SubscriptionObject, WebhookEnvelope,
};

/// Stripe notifications the gateway reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEvent {
    /// `checkout.session.completed`
    CheckoutCompleted(Purchase),
    /// `invoice.paid` / `invoice.payment_succeeded`
    InvoicePaid(Purchase),
    /// `customer.subscription.deleted`
    SubscriptionDeleted { customer_id: Option<String> },
    /// Anything else, acknowledged without side effects.
    Other(String),
}

/// What a successful payment tells us about the payer and the product bought.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Purchase {
    pub email: Option<String>,
    pub customer_id: Option<String>,
    /// Explicit `metadata.plan` set on the session or invoice.
    pub plan_hint: Option<String>,
    /// Product names already present in the payload.
    pub product_names: Vec<String>,
    /// Products whose name has to be fetched from Stripe.
    pub product_ids: Vec<String>,
    /// Checkout session whose line items have to be fetched from Stripe.
    pub checkout_session_id: Option<String>,
}

impl PaymentEvent {
    /// Decodes an already verified webhook payload.
    pub fn from_payload(payload: &str) -> Res<PaymentEvent> {
        let envelope: WebhookEnvelope = serde_json::from_str(payload)
            .map_err(|e| AppError::BadRequest(format!("Webhook Error: invalid payload: {}", e)))?;

        log::info!("Processing webhook event {}: {}", envelope.id, envelope.type_);

        let object = envelope.data.object;
        let event = match envelope.type_.as_str() {
            "checkout.session.completed" => {
                let session: CheckoutSessionObject = decode(object)?;
                PaymentEvent::CheckoutCompleted(Purchase::from(session))
            }
            "invoice.paid" | "invoice.payment_succeeded" => {
                let invoice: InvoiceObject = decode(object)?;
                PaymentEvent::InvoicePaid(Purchase::from(invoice))
            }
            "customer.subscription.deleted" => {
                let subscription: SubscriptionObject = decode(object)?;
                log::debug!("Subscription deleted: {}", subscription.id);
                PaymentEvent::SubscriptionDeleted {
                    customer_id: subscription.customer.map(ExpandableId::into_id),
                }
            }
            other => PaymentEvent::Other(other.to_string()),
        };
        Ok(event)
    }
}

impl From<CheckoutSessionObject> for Purchase {
    fn from(session: CheckoutSessionObject) -> Self {
        let email = session
            .customer_details
            .and_then(|details| details.email)
            .or(session.customer_email);

        Purchase {
            email: non_empty(email),
            customer_id: session.customer.map(ExpandableId::into_id),
            plan_hint: session.metadata.and_then(|mut m| m.remove("plan")),
            product_names: Vec::new(),
            product_ids: Vec::new(),
            checkout_session_id: Some(session.id),
        }
    }
}

impl From<InvoiceObject> for Purchase {
    fn from(invoice: InvoiceObject) -> Self {
        let mut product_names = Vec::new();
        let mut product_ids = Vec::new();

        for line in invoice.lines.map(|lines| lines.data).unwrap_or_default() {
            if let Some(description) = line.description {
                product_names.push(description);
            }
            if let Some(price) = line.price {
                if let Some(nickname) = price.nickname {
                    product_names.push(nickname);
                }
                if let Some(product) = price.product {
                    product_ids.push(product.into_id());
                }
            }
        }

        Purchase {
            email: non_empty(invoice.customer_email),
            customer_id: invoice.customer.map(ExpandableId::into_id),
            plan_hint: invoice.metadata.and_then(|mut m| m.remove("plan")),
            product_names,
            product_ids,
            checkout_session_id: None,
        }
    }
}

fn decode<T: DeserializeOwned>(object: serde_json::Value) -> Res<T> {
    serde_json::from_value(object)
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: invalid event object: {}", e)))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
