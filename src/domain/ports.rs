use super::account::Account;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Delivers human-readable transfer notices to account holders.
///
/// Callers treat delivery as best-effort: an `Err` is reported but never
/// changes the outcome of the operation that produced the notice.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    async fn notify(&self, account: &Account, message: &str) -> Result<()>;
}

pub type NotificationPortRef = Arc<dyn NotificationPort>;
