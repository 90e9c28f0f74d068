use super::coordinator::TransferCoordinator;
use crate::domain::command::LedgerCommand;
use crate::error::{LedgerError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::error;

/// Outcome of running a batch of commands.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub applied: usize,
    /// Failed commands, keyed by their position in the input.
    pub failures: Vec<(usize, LedgerError)>,
}

impl BatchReport {
    fn record(&mut self, index: usize, result: Result<()>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(err) => self.failures.push((index, err)),
        }
    }

    /// Records a finished transfer task. A task that panicked or was cancelled
    /// is reported as a failure of the command it was running.
    fn record_joined(
        &mut self,
        pending: &mut HashMap<Id, usize>,
        joined: std::result::Result<(Id, Result<()>), JoinError>,
    ) {
        let (task_id, result) = match joined {
            Ok((task_id, result)) => (task_id, result),
            Err(err) => {
                error!(error = %err, "Transfer task failed");
                (err.id(), Err(LedgerError::TaskFailed(err.to_string())))
            }
        };
        match pending.remove(&task_id) {
            Some(index) => self.record(index, result),
            None => error!(task_id = %task_id, "Finished transfer task was not tracked"),
        }
    }
}

/// Runs commands in input order.
///
/// Consecutive transfers are dispatched onto up to `workers` concurrent tasks.
/// An account creation first waits for every in-flight transfer, so a
/// transfer never observes an account created later in the input.
pub async fn run_batch<I>(
    coordinator: Arc<TransferCoordinator>,
    commands: I,
    workers: usize,
) -> BatchReport
where
    I: IntoIterator<Item = (usize, LedgerCommand)>,
{
    let workers = workers.max(1);
    let mut report = BatchReport::default();
    let mut in_flight = JoinSet::new();
    let mut pending = HashMap::new();

    for (index, command) in commands {
        match command {
            LedgerCommand::Create {
                account_id,
                initial_balance,
            } => {
                while let Some(joined) = in_flight.join_next_with_id().await {
                    report.record_joined(&mut pending, joined);
                }
                report.record(index, coordinator.create_account(account_id, initial_balance));
            }
            LedgerCommand::Transfer(operation) => {
                while in_flight.len() >= workers {
                    if let Some(joined) = in_flight.join_next_with_id().await {
                        report.record_joined(&mut pending, joined);
                    }
                }
                let coordinator = coordinator.clone();
                let task = in_flight.spawn(async move { coordinator.transfer(&operation).await });
                pending.insert(task.id(), index);
            }
        }
    }

    while let Some(joined) = in_flight.join_next_with_id().await {
        report.record_joined(&mut pending, joined);
    }
    report.failures.sort_by_key(|(index, _)| *index);
    report
}
