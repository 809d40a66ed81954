use serde::Deserialize;

#[derive(Deserialize)]
pub struct CheckoutQuery {
    pub client_id: String,
    pub plan: String,
}
