use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique, non-empty identifier of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            Err(LedgerError::ValidationError(
                "Account id must not be empty".to_string(),
            ))
        } else {
            Ok(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccountId {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<AccountId> for String {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-negative monetary value held by an account.
///
/// Wraps `rust_decimal::Decimal` so that arithmetic stays exact across any
/// number of transfers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Balance(Decimal);

/// Represents a positive monetary amount moved by a deposit, withdrawal or transfer.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(
                "Amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value >= Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::ValidationError(
                "Balance must not be negative".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Adds `amount`, or returns `None` if the result is not representable.
    pub fn checked_add(self, amount: Amount) -> Option<Self> {
        self.0.checked_add(amount.0).map(Self)
    }

    /// Subtracts `amount`, or returns `None` if the result would go below zero.
    pub fn checked_sub(self, amount: Amount) -> Option<Self> {
        if self.0 >= amount.0 {
            Some(Self(self.0 - amount.0))
        } else {
            None
        }
    }
}

impl TryFrom<Decimal> for Balance {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Balance> for Decimal {
    fn from(balance: Balance) -> Self {
        balance.0
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A uniquely identified balance holder.
///
/// The balance only changes through [`Account::deposit`] and [`Account::withdraw`].
/// Both check their precondition before touching the balance. Neither is
/// atomic on its own with respect to other callers: whoever mutates an account
/// stored in the ledger must hold that account's lock for the whole
/// read-modify-write span.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Account {
    id: AccountId,
    balance: Balance,
}

impl Account {
    pub fn new(id: AccountId) -> Self {
        Self::with_balance(id, Balance::ZERO)
    }

    pub fn with_balance(id: AccountId, balance: Balance) -> Self {
        Self { id, balance }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Reports whether [`Account::deposit`] would succeed for `amount`.
    pub fn can_deposit(&self, amount: Amount) -> bool {
        self.balance.checked_add(amount).is_some()
    }

    /// Adds funds to the balance, failing if the result would overflow
    pub fn deposit(&mut self, amount: Amount) -> Result<()> {
        match self.balance.checked_add(amount) {
            Some(total) => {
                self.balance = total;
                Ok(())
            }
            None => Err(LedgerError::BalanceOverflow(self.id.clone())),
        }
    }

    /// Reports whether [`Account::withdraw`] would succeed for `amount`.
    pub fn can_withdraw(&self, amount: Amount) -> bool {
        self.balance.checked_sub(amount).is_some()
    }

    /// Withdraws funds if sufficient, leaving the balance untouched otherwise
    pub fn withdraw(&mut self, amount: Amount) -> Result<()> {
        match self.balance.checked_sub(amount) {
            Some(remaining) => {
                self.balance = remaining;
                Ok(())
            }
            None => Err(LedgerError::InsufficientFunds(self.id.clone())),
        }
    }
}
