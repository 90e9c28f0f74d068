use super::account::{AccountId, Balance};
use super::transfer::TransferOperation;

/// A single instruction for the ledger, as read from an input source.
#[derive(Debug, PartialEq, Clone)]
pub enum LedgerCommand {
    Create {
        account_id: AccountId,
        initial_balance: Balance,
    },
    Transfer(TransferOperation),
}
