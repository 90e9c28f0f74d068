#![allow(dead_code)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};
use transfer_ledger::application::coordinator::TransferCoordinator;
use transfer_ledger::config::LedgerConfig;
use transfer_ledger::domain::account::{Account, AccountId, Balance};
use transfer_ledger::domain::ports::NotificationPort;
use transfer_ledger::error::Result;
use transfer_ledger::infrastructure::in_memory::InMemoryAccountStore;

/// Notifier that keeps every notice it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(AccountId, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(AccountId, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn notices_for(&self, id: &str) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(account, _)| account.as_str() == id)
            .map(|(_, message)| message)
            .collect()
    }
}

#[async_trait]
impl NotificationPort for RecordingNotifier {
    async fn notify(&self, account: &Account, message: &str) -> Result<()> {
        self.notices
            .lock()
            .unwrap()
            .push((account.id().clone(), message.to_string()));
        Ok(())
    }
}

pub fn id(value: &str) -> AccountId {
    AccountId::new(value).unwrap()
}

pub fn coordinator(
    config: LedgerConfig,
) -> (Arc<TransferCoordinator>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let coordinator = Arc::new(TransferCoordinator::with_config(
        InMemoryAccountStore::new(),
        notifier.clone(),
        config,
    ));
    (coordinator, notifier)
}

pub fn open_account(coordinator: &TransferCoordinator, value: &str, balance: Decimal) {
    coordinator
        .create_account(id(value), Balance::new(balance).unwrap())
        .unwrap();
}

pub fn balance_of(coordinator: &TransferCoordinator, value: &str) -> Decimal {
    coordinator
        .get_account(&id(value))
        .unwrap()
        .balance()
        .value()
}
