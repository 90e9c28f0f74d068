pub mod in_memory;
pub mod interrupt;
pub mod notification;
