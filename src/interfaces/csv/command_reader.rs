use crate::domain::account::{AccountId, Amount, Balance};
use crate::domain::command::LedgerCommand;
use crate::domain::transfer::TransferOperation;
use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum CommandType {
    Create,
    Transfer,
}

/// One raw CSV row: `type, account, counterpart, amount`.
#[derive(Debug, Deserialize)]
struct CommandRecord {
    r#type: CommandType,
    account: String,
    counterpart: Option<String>,
    amount: Option<Decimal>,
}

impl CommandRecord {
    fn into_command(self) -> Result<LedgerCommand> {
        let account_id = AccountId::new(self.account)?;
        match self.r#type {
            CommandType::Create => {
                let initial_balance = match self.amount {
                    Some(amount) => Balance::new(amount)?,
                    None => Balance::ZERO,
                };
                Ok(LedgerCommand::Create {
                    account_id,
                    initial_balance,
                })
            }
            CommandType::Transfer => {
                let counterpart = self.counterpart.ok_or_else(|| {
                    LedgerError::ValidationError("Transfer missing counterpart".to_string())
                })?;
                let amount = self.amount.ok_or_else(|| {
                    LedgerError::ValidationError("Transfer missing amount".to_string())
                })?;
                Ok(LedgerCommand::Transfer(TransferOperation::new(
                    account_id,
                    AccountId::new(counterpart)?,
                    Amount::new(amount)?,
                )))
            }
        }
    }
}

/// Reads ledger commands from a CSV source.
///
/// Whitespace around fields is trimmed and short rows are accepted, so the
/// trailing fields of a `create` row can be left out.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads, deserializes and validates commands.
    pub fn commands(self) -> impl Iterator<Item = Result<LedgerCommand>> {
        self.reader
            .into_deserialize::<CommandRecord>()
            .map(|result| result.map_err(LedgerError::from).and_then(CommandRecord::into_command))
    }
}
