pub mod quota;

pub use quota::{QuotaStatus, check_quota, get_limit};
