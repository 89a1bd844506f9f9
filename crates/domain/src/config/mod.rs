//! Configuration module for the zone manager
//!
//! - `root`: Main configuration and CLI overrides
//! - `notify`: NOTIFY listener binding and worker bound
//! - `dns`: Timeouts and cache timings
//! - `logging`: Logging settings
//! - `views`: Views, their resolvers and zones
//! - `errors`: Configuration errors

pub mod dns;
pub mod errors;
pub mod logging;
pub mod notify;
pub mod root;
pub mod views;

pub use dns::DnsConfig;
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use notify::NotifyConfig;
pub use root::{CliOverrides, Config};
pub use views::{ViewConfig, ZoneConfig};
