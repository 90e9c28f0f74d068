use crate::config::{LedgerConfig, LockOrder};
use crate::domain::account::{Account, AccountId, Amount, Balance};
use crate::domain::ports::NotificationPortRef;
use crate::domain::transfer::TransferOperation;
use crate::error::{LedgerError, Result};
use crate::infrastructure::in_memory::{AccountLock, InMemoryAccountStore};
use crate::infrastructure::interrupt::{InterruptHandle, interrupt_channel};
use tracing::{debug, error, info, instrument, warn};

/// Locks held for the duration of one transfer.
///
/// `destination` is `None` for a self-transfer, where the single source lock
/// covers both sides. Dropping this value releases everything it holds.
struct TransferLocks {
    source: AccountLock,
    destination: Option<AccountLock>,
}

impl TransferLocks {
    fn destination(&self) -> &AccountLock {
        self.destination.as_ref().unwrap_or(&self.source)
    }
}

/// Orchestrates transfers between accounts of one store.
///
/// A transfer resolves both accounts, takes both account locks with a
/// bounded wait, withdraws from the source, deposits into the destination,
/// notifies both owners and finally releases the locks. Locks are scoped
/// guards, so they are released on every exit path: a failed second
/// acquisition, insufficient funds, or the transfer future being dropped.
pub struct TransferCoordinator {
    store: InMemoryAccountStore,
    notifier: NotificationPortRef,
    config: LedgerConfig,
    interrupt: InterruptHandle,
}

impl TransferCoordinator {
    pub fn new(store: InMemoryAccountStore, notifier: NotificationPortRef) -> Self {
        Self::with_config(store, notifier, LedgerConfig::default())
    }

    pub fn with_config(
        store: InMemoryAccountStore,
        notifier: NotificationPortRef,
        config: LedgerConfig,
    ) -> Self {
        let (interrupt, _) = interrupt_channel();
        Self {
            store,
            notifier,
            config,
            interrupt,
        }
    }

    pub fn store(&self) -> &InMemoryAccountStore {
        &self.store
    }

    pub fn create_account(&self, id: AccountId, initial_balance: Balance) -> Result<()> {
        self.store.create(Account::with_balance(id.clone(), initial_balance))?;
        debug!(account_id = %id, balance = %initial_balance, "Account created");
        Ok(())
    }

    pub fn get_account(&self, id: &AccountId) -> Option<Account> {
        self.store.get(id)
    }

    /// Cancels every pending lock wait and makes later transfers fail with
    /// [`LedgerError::LockInterrupted`].
    pub fn interrupt(&self) {
        warn!("Interrupting pending and future transfers");
        self.interrupt.interrupt();
    }

    /// Moves `operation.amount` from the source account to the destination.
    #[instrument(
        skip_all,
        fields(
            from = %operation.account_from_id,
            to = %operation.account_to_id,
            amount = %operation.amount,
        )
    )]
    pub async fn transfer(&self, operation: &TransferOperation) -> Result<()> {
        match self.execute(operation).await {
            Ok(()) => {
                info!("Transfer completed");
                Ok(())
            }
            Err(err) => {
                if err.is_lock_failure() {
                    warn!(error = %err, "Transfer aborted");
                } else {
                    debug!(error = %err, "Transfer rejected");
                }
                Err(err)
            }
        }
    }

    async fn execute(&self, operation: &TransferOperation) -> Result<()> {
        let from = &operation.account_from_id;
        let to = &operation.account_to_id;

        for id in [from, to] {
            if !self.store.contains(id) {
                return Err(LedgerError::AccountNotFound(id.clone()));
            }
        }

        let locks = self.acquire(operation).await?;
        let (source, destination) = self.apply(&locks, operation.amount)?;

        self.notify(
            &source,
            format!("{} is transferred to {}", operation.amount, to),
        )
        .await;
        self.notify(
            &destination,
            format!("{} is transferred from {}", operation.amount, from),
        )
        .await;

        drop(locks);
        Ok(())
    }

    async fn acquire(&self, operation: &TransferOperation) -> Result<TransferLocks> {
        let from = &operation.account_from_id;
        let to = &operation.account_to_id;

        if operation.is_self_transfer() {
            return Ok(TransferLocks {
                source: self.lock(from).await?,
                destination: None,
            });
        }

        let source_first = match self.config.lock_order {
            LockOrder::Request => true,
            LockOrder::Canonical => from < to,
        };

        let (source, destination) = if source_first {
            let source = self.lock(from).await?;
            let destination = self.lock(to).await?;
            (source, destination)
        } else {
            let destination = self.lock(to).await?;
            let source = self.lock(from).await?;
            (source, destination)
        };

        Ok(TransferLocks {
            source,
            destination: Some(destination),
        })
    }

    async fn lock(&self, id: &AccountId) -> Result<AccountLock> {
        self.store
            .lock_interruptible(id, self.config.lock_timeout(), &self.interrupt.subscribe())
            .await
    }

    /// Withdraws then deposits under the held locks.
    ///
    /// Both sides are checked before either balance changes, so a rejected
    /// transfer leaves no partial debit. Returns snapshots of the source and
    /// destination after the transfer.
    fn apply(&self, locks: &TransferLocks, amount: Amount) -> Result<(Account, Account)> {
        self.store.update(&locks.source, |account| {
            if account.can_withdraw(amount) {
                Ok(())
            } else {
                Err(LedgerError::InsufficientFunds(account.id().clone()))
            }
        })?;
        if let Some(destination) = &locks.destination {
            self.store.update(destination, |account| {
                if account.can_deposit(amount) {
                    Ok(())
                } else {
                    Err(LedgerError::BalanceOverflow(account.id().clone()))
                }
            })?;
        }

        let source = self.store.update(&locks.source, |account| {
            account.withdraw(amount)?;
            Ok(account.clone())
        })?;
        let destination = match self.store.update(locks.destination(), |account| {
            account.deposit(amount)?;
            Ok(account.clone())
        }) {
            Ok(destination) => destination,
            Err(err) => {
                // The destination was cleared between the check and the deposit.
                self.refund(&locks.source, amount);
                return Err(err);
            }
        };

        if locks.destination.is_none() {
            return Ok((destination.clone(), destination));
        }
        Ok((source, destination))
    }

    fn refund(&self, lock: &AccountLock, amount: Amount) {
        if let Err(err) = self.store.update(lock, |account| account.deposit(amount)) {
            error!(account_id = %lock.account_id(), error = %err, "Failed to refund transfer source");
        }
    }

    async fn notify(&self, account: &Account, message: String) {
        if let Err(err) = self.notifier.notify(account, &message).await {
            warn!(account_id = %account.id(), error = %err, "Transfer notification failed");
        }
    }
}
