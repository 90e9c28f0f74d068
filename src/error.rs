use crate::domain::account::AccountId;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account id {0} already exists!")]
    DuplicateAccount(AccountId),
    #[error("Account {0} does not exist")]
    AccountNotFound(AccountId),
    #[error("Account {0} has insufficient funds")]
    InsufficientFunds(AccountId),
    #[error("Deposit would overflow the balance of account {0}")]
    BalanceOverflow(AccountId),
    #[error("Timed out after {timeout:?} waiting for the lock on account {account_id}")]
    LockTimeout {
        account_id: AccountId,
        timeout: Duration,
    },
    #[error("Wait for the lock on account {0} was interrupted")]
    LockInterrupted(AccountId),
    #[error("Task failed: {0}")]
    TaskFailed(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Notification error: {0}")]
    NotificationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl LedgerError {
    /// True for failures to obtain an account lock, whether by timeout or interruption.
    pub fn is_lock_failure(&self) -> bool {
        matches!(
            self,
            LedgerError::LockTimeout { .. } | LedgerError::LockInterrupted(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
