use std::collections::HashMap;

use serde::Deserialize;

/// Envelope of every Stripe webhook delivery.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
pub struct EnvelopeData {
    pub object: serde_json::Value,
}

/// Either a bare id or the expanded object carrying it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExpandableId {
    Id(String),
    Object { id: String },
}

impl ExpandableId {
    pub fn into_id(self) -> String {
        match self {
            ExpandableId::Id(id) | ExpandableId::Object { id } => id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer: Option<ExpandableId>,
    pub customer_email: Option<String>,
    pub customer_details: Option<CustomerDetails>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceObject {
    pub id: Option<String>,
    pub customer: Option<ExpandableId>,
    pub customer_email: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub lines: Option<InvoiceLines>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceLines {
    #[serde(default)]
    pub data: Vec<InvoiceLine>,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceLine {
    pub description: Option<String>,
    pub price: Option<LinePrice>,
}

#[derive(Debug, Deserialize)]
pub struct LinePrice {
    pub nickname: Option<String>,
    pub product: Option<ExpandableId>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Option<ExpandableId>,
}
