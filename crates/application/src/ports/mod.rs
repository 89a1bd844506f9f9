mod configuration_repository;
mod zone_cache;
mod zone_executor;

pub use configuration_repository::ConfigurationRepository;
pub use zone_cache::ZoneCachePort;
pub use zone_executor::{ZoneExecutor, ZoneExecutorFactory};
