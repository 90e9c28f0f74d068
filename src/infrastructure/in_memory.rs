use super::interrupt::InterruptSignal;
use crate::domain::account::{Account, AccountId};
use crate::error::{LedgerError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

/// Exclusive hold on one account's lock.
///
/// The lock is released when this value is dropped, so every exit path of
/// the holder releases it. Only the holder can release it.
#[must_use = "the account lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct AccountLock {
    account_id: AccountId,
    guard: OwnedMutexGuard<()>,
}

impl AccountLock {
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    fn is_from(&self, mutex: &Arc<Mutex<()>>) -> bool {
        Arc::ptr_eq(OwnedMutexGuard::mutex(&self.guard), mutex)
    }
}

/// A thread-safe in-memory registry of accounts and their locks.
///
/// Clones share the same underlying maps, so a store can be handed to any
/// number of tasks. Accounts live in a concurrent map that is safe for
/// lookups and inserts without an outer lock. Balance changes additionally
/// require the per-account lock, obtained through [`InMemoryAccountStore::lock`]
/// and presented to [`InMemoryAccountStore::update`].
///
/// Locks are created on first use and kept for the lifetime of the store,
/// one per account id. There is no store-wide lock.
#[derive(Default, Clone)]
pub struct InMemoryAccountStore {
    accounts: Arc<DashMap<AccountId, Account>>,
    locks: Arc<DashMap<AccountId, Arc<Mutex<()>>>>,
}

impl InMemoryAccountStore {
    /// Creates a new, empty in-memory account store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the account unless its id is already taken.
    pub fn create(&self, account: Account) -> Result<()> {
        match self.accounts.entry(account.id().clone()) {
            Entry::Occupied(entry) => Err(LedgerError::DuplicateAccount(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(account);
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the account, if it exists.
    pub fn get(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).map(|account| account.value().clone())
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.contains_key(id)
    }

    /// Returns a snapshot of every account, sorted by id.
    pub fn all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Removes every account. The lock table is left untouched.
    pub fn clear(&self) {
        self.accounts.clear();
    }

    /// Acquires the account's lock, waiting at most `timeout`.
    pub async fn lock(&self, id: &AccountId, timeout: Duration) -> Result<AccountLock> {
        self.acquire(id, timeout, None).await
    }

    /// Acquires the account's lock, waiting at most `timeout` and giving up
    /// early with [`LedgerError::LockInterrupted`] once `interrupt` fires.
    pub async fn lock_interruptible(
        &self,
        id: &AccountId,
        timeout: Duration,
        interrupt: &InterruptSignal,
    ) -> Result<AccountLock> {
        self.acquire(id, timeout, Some(interrupt)).await
    }

    async fn acquire(
        &self,
        id: &AccountId,
        timeout: Duration,
        interrupt: Option<&InterruptSignal>,
    ) -> Result<AccountLock> {
        if interrupt.is_some_and(InterruptSignal::is_triggered) {
            return Err(LedgerError::LockInterrupted(id.clone()));
        }

        let mutex = self.mutex_for(id);
        trace!(account_id = %id, ?timeout, "Waiting for account lock");

        let interrupted = async {
            match interrupt {
                Some(signal) => signal.triggered().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = interrupted => Err(LedgerError::LockInterrupted(id.clone())),
            acquired = tokio::time::timeout(timeout, mutex.lock_owned()) => match acquired {
                Ok(guard) => {
                    trace!(account_id = %id, "Account lock acquired");
                    Ok(AccountLock {
                        account_id: id.clone(),
                        guard,
                    })
                }
                Err(_) => Err(LedgerError::LockTimeout {
                    account_id: id.clone(),
                    timeout,
                }),
            },
        }
    }

    /// Releases a lock previously returned by this store.
    pub fn unlock(&self, lock: AccountLock) {
        trace!(account_id = %lock.account_id, "Account lock released");
        drop(lock);
    }

    /// Reports whether some caller currently holds the account's lock.
    pub fn is_locked(&self, id: &AccountId) -> bool {
        self.locks
            .get(id)
            .is_some_and(|mutex| mutex.try_lock().is_err())
    }

    /// Applies `f` to the account guarded by `lock`.
    ///
    /// Holding the lock is what makes a check-then-act mutation such as a
    /// withdrawal safe, so the lock must come from this store.
    pub fn update<T>(
        &self,
        lock: &AccountLock,
        f: impl FnOnce(&mut Account) -> Result<T>,
    ) -> Result<T> {
        let id = lock.account_id();
        let owned = self
            .locks
            .get(id)
            .is_some_and(|mutex| lock.is_from(mutex.value()));
        if !owned {
            return Err(LedgerError::ValidationError(format!(
                "Lock for account {id} does not belong to this store"
            )));
        }

        let mut account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.clone()))?;
        f(account.value_mut())
    }

    fn mutex_for(&self, id: &AccountId) -> Arc<Mutex<()>> {
        self.locks
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }
}
