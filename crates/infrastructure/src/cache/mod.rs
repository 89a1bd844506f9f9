pub mod scheduler;
pub mod zone_cache;

pub use scheduler::{RefreshScheduler, RefreshTask};
pub use zone_cache::{CacheState, ZoneCache, ZoneCacheSettings, ZoneSnapshot};
