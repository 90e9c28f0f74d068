use super::account::{AccountId, Amount};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Deserialize;

/// A request to move `amount` from one account to another.
///
/// Source and destination may name the same account.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct TransferOperation {
    pub account_from_id: AccountId,
    pub account_to_id: AccountId,
    pub amount: Amount,
}

impl TransferOperation {
    pub fn new(account_from_id: AccountId, account_to_id: AccountId, amount: Amount) -> Self {
        Self {
            account_from_id,
            account_to_id,
            amount,
        }
    }

    /// Builds an operation from raw values, validating each of them.
    pub fn parse(from: &str, to: &str, amount: Decimal) -> Result<Self> {
        Ok(Self::new(
            AccountId::new(from)?,
            AccountId::new(to)?,
            Amount::new(amount)?,
        ))
    }

    pub fn is_self_transfer(&self) -> bool {
        self.account_from_id == self.account_to_id
    }
}
