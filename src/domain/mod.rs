pub mod account;
pub mod command;
pub mod ports;
pub mod transfer;
