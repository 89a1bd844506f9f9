use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::{DomainError, Zone};

use crate::ports::ZoneCachePort;
use crate::services::ZoneLocator;

pub struct FindZoneUseCase {
    locator: Arc<ZoneLocator>,
    cache: Arc<dyn ZoneCachePort>,
}

impl FindZoneUseCase {
    pub fn new(locator: Arc<ZoneLocator>, cache: Arc<dyn ZoneCachePort>) -> Self {
        Self { locator, cache }
    }

    /// The configured zone, with the records of its cached snapshot when
    /// there is one.
    #[instrument(skip(self))]
    pub async fn execute(&self, view: &str, zone: &str) -> Result<Zone, DomainError> {
        let (_, mut found) = self.locator.require_zone(view, zone).await?;
        if let Some(records) = self.cache.cached_records(&found.identity()) {
            found.records = records;
        }
        Ok(found)
    }
}
