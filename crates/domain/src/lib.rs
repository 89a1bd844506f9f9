//! Zone Manager Domain Layer
pub mod config;
pub mod errors;
pub mod record;
pub mod record_filter;
pub mod zone;
pub mod zone_name;

pub use config::{CliOverrides, Config, ConfigError};
pub use errors::DomainError;
pub use record::{
    find_soa, FieldValue, Operation, Record, RecordData, RecordType, SoaData, ZoneType, APEX,
    DEFAULT_TTL,
};
pub use record_filter::{RecordFilter, WildcardPattern};
pub use zone::{normalize_zone_name, Resolver, TsigAlgorithm, TsigKey, View, Zone, ZoneIdentity};
pub use zone_name::ZoneNameResolver;
