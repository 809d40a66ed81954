use async_trait::async_trait;
use common::error::{AppError, Res};
use stripe::{
    CheckoutSession, CheckoutSessionId, CheckoutSessionItem, Client, Customer, CustomerId,
    Product, ProductId,
};

/// Lookups against the payment provider needed while reconciling events.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// Product names of the line items bought in a checkout session.
    async fn checkout_line_item_names(&self, session_id: &str) -> Res<Vec<String>>;

    async fn product_name(&self, product_id: &str) -> Res<Option<String>>;

    /// Client id of a customer: its email, else the `client_id` metadata entry.
    async fn customer_client_id(&self, customer_id: &str) -> Res<Option<String>>;
}

pub struct StripeBillingProvider {
    client: Client,
}

impl StripeBillingProvider {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BillingProvider for StripeBillingProvider {
    async fn checkout_line_item_names(&self, session_id: &str) -> Res<Vec<String>> {
        let id = session_id.parse::<CheckoutSessionId>().map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse checkout session id: {}. {}",
                session_id, e
            ))
        })?;

        let session =
            CheckoutSession::retrieve(&self.client, &id, &["line_items.data.price.product"])
                .await
                .map_err(AppError::from)?;

        Ok(session
            .line_items
            .map(|items| items.data.into_iter().filter_map(line_item_name).collect())
            .unwrap_or_default())
    }

    async fn product_name(&self, product_id: &str) -> Res<Option<String>> {
        let id = product_id.parse::<ProductId>().map_err(|e| {
            AppError::Internal(format!("Failed to parse product id: {}. {}", product_id, e))
        })?;

        let product = Product::retrieve(&self.client, &id, &[])
            .await
            .map_err(AppError::from)?;
        Ok(product.name)
    }

    async fn customer_client_id(&self, customer_id: &str) -> Res<Option<String>> {
        let id = customer_id.parse::<CustomerId>().map_err(|e| {
            AppError::Internal(format!(
                "Failed to parse customer id: {}. {}",
                customer_id, e
            ))
        })?;

        let customer = Customer::retrieve(&self.client, &id, &[])
            .await
            .map_err(AppError::from)?;

        Ok(customer.email.or_else(|| {
            customer
                .metadata
                .as_ref()
                .and_then(|metadata| metadata.get("client_id").cloned())
        }))
    }
}

/// Name of the product behind a line item, the price nickname as a fallback.
fn line_item_name(item: CheckoutSessionItem) -> Option<String> {
    let price = item.price?;
    price
        .product
        .as_ref()
        .and_then(|product| product.as_object())
        .and_then(|product| product.name.clone())
        .or(price.nickname)
}
