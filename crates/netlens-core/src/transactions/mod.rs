//! Bounded in-memory record of intercepted calls.

mod log;

pub use log::{TransactionLog, DEFAULT_LOG_CAPACITY};
