//! Infrastructure layer: the ledger service, key-value persistence, seed
//! data, configuration, and reports.

pub mod config;
pub mod kv;
pub mod ledger;
pub mod persistence;
pub mod reports;
pub mod seed;


pub use config::{ConfigError, IntegrityMode, LedgerConfig};
pub use kv::{FileKeyValueStore, InMemoryKeyValueStore, KeyValueStore, StoreError};
pub use ledger::{ConfiguredLedger, Ledger, LedgerError};
pub use persistence::Collection;
pub use reports::{DashboardStats, Report};
