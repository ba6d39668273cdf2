//! Ambient plumbing shared by `dhcp-server` and `dns-server`: configuration
//! loading, the JSON state-store adapter, and the file-backed log sink.
//! None of it knows anything about DHCP or DNS semantics — spec.md §1 calls
//! all three "external collaborators" of the engines proper.

pub mod config;
pub mod logging;
pub mod store;

pub use config::{Config, ConfigError};
pub use store::{BusyAddressSet, StoreError, ZoneRecord, ZoneTable};
