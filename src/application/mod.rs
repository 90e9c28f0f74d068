//! Application layer containing the transfer orchestration.
//!
//! `TransferCoordinator` is the entry point for account creation, lookup and
//! transfers. `batch` drives a coordinator from a stream of commands, running
//! transfers on concurrent `tokio` tasks.

pub mod batch;
pub mod coordinator;
