use crate::domain::account::Account;
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct AccountRecord<'a> {
    account: &'a str,
    balance: Decimal,
}

/// Writes final account balances as CSV with an `account,balance` header.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts<'a, I>(&mut self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Account>,
    {
        for account in accounts {
            self.writer.serialize(AccountRecord {
                account: account.id().as_str(),
                balance: account.balance().value().normalize(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, Balance};
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_accounts() {
        let accounts = vec![
            Account::with_balance(
                AccountId::new("X").unwrap(),
                Balance::new(dec!(50.0)).unwrap(),
            ),
            Account::with_balance(
                AccountId::new("Y").unwrap(),
                Balance::new(dec!(100.2500)).unwrap(),
            ),
        ];

        let mut buffer = Vec::new();
        AccountWriter::new(&mut buffer)
            .write_accounts(&accounts)
            .unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "account,balance\nX,50\nY,100.25\n");
    }

    #[test]
    fn test_write_no_accounts() {
        let mut buffer = Vec::new();
        AccountWriter::new(&mut buffer).write_accounts(&[]).unwrap();
        assert!(buffer.is_empty());
    }
}
