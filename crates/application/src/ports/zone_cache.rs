use async_trait::async_trait;
use zone_manager_domain::{Record, ZoneIdentity};

/// The view use cases get of the background zone cache.
#[async_trait]
pub trait ZoneCachePort: Send + Sync {
    /// Records of the cached snapshot, possibly stale while the cache is
    /// suspended. `None` when the zone is not cached.
    fn cached_records(&self, identity: &ZoneIdentity) -> Option<Vec<Record>>;

    /// Marks a zone as needing resynchronization.
    fn flag_for_refresh(&self, identity: &ZoneIdentity);

    /// Brings flagged zones up to date.
    async fn refresh(&self);
}
