use chrono::{DateTime, Utc};

/// Key of the billing period `now` falls into. Periods are UTC calendar months.
pub fn billing_period(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

pub fn current_billing_period() -> String {
    billing_period(Utc::now())
}

/// Loose check used to decide whether a client id can be forwarded as an email.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}
