use crate::domain::account::Account;
use crate::domain::ports::NotificationPort;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

/// Delivers notices by emitting them as structured log events.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationPort for LoggingNotifier {
    async fn notify(&self, account: &Account, message: &str) -> Result<()> {
        info!(
            account_id = %account.id(),
            balance = %account.balance(),
            "Sending notification to owner: {message}"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::AccountId;
    use crate::domain::ports::NotificationPortRef;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_logging_notifier_as_port() {
        let notifier: NotificationPortRef = Arc::new(LoggingNotifier::new());
        let account = Account::new(AccountId::new("A").unwrap());

        let result = notifier.notify(&account, "10 is transferred to B").await;
        assert!(result.is_ok());
    }
}
