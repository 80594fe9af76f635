//! Core domain types: configuration snapshot, environments and recorded transactions.

pub mod config;
pub mod environment;
pub mod transaction;

pub use config::{DebugConfig, TimeoutOverrides};
pub use environment::{Environment, EnvironmentConfig};
pub use transaction::{
    now_millis, NetworkRequest, NetworkResponse, NetworkTransaction, TransactionState,
    UNREADABLE_BODY,
};
