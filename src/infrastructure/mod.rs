//! Infrastructure layer
//!
//! This module contains external integrations and adapters.

mod config;
mod logging;
mod pulp_cli;
mod store;

pub use config::{Config, ConfigError, SmokeTestConfig};
pub use logging::init_logging;
pub use pulp_cli::{PulpCli, parse_href, parse_identifiers};
pub use store::{ClearReport, CommandRecordStore, RecordStore, StoreCommands};
