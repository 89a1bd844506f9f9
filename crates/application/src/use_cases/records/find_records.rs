use std::sync::Arc;
use tracing::{debug, instrument};
use zone_manager_domain::{DomainError, Record, RecordFilter, RecordType};

use crate::ports::ZoneCachePort;
use crate::services::{into_service_error, ZoneLocator};

/// Lists the records of a zone that pass a type and wildcard filter.
pub struct FindRecordsUseCase {
    locator: Arc<ZoneLocator>,
    cache: Arc<dyn ZoneCachePort>,
}

impl FindRecordsUseCase {
    pub fn new(locator: Arc<ZoneLocator>, cache: Arc<dyn ZoneCachePort>) -> Self {
        Self { locator, cache }
    }

    /// # Arguments
    ///
    /// * `types` - Types to keep; empty or containing `ANY` keeps all
    /// * `search` - `*`-wildcard pattern, `None` matches everything
    /// * `use_cache` - Serve from the cached snapshot when the zone is cached
    ///
    /// # Errors
    ///
    /// * `DomainError::ViewNotFound` / `DomainError::ZoneNotFound`
    /// * `DomainError::Service` - If the zone transfer layer failed
    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        view: &str,
        zone: &str,
        types: &[RecordType],
        search: Option<&str>,
        use_cache: bool,
    ) -> Result<Vec<Record>, DomainError> {
        let (found_view, found_zone) = self.locator.require_zone(view, zone).await?;
        let filter = RecordFilter::new(&found_zone.name, types.to_vec(), search);

        let cached = if use_cache {
            self.cache.cached_records(&found_zone.identity())
        } else {
            None
        };

        let records = match cached {
            Some(records) => {
                debug!(zone = %found_zone.name, count = records.len(), "Serving records from cache");
                records
            }
            None => self
                .locator
                .bind(&found_view, &found_zone)
                .await
                .map_err(into_service_error)?
                .find_records()
                .await
                .map_err(into_service_error)?,
        };

        let matched = filter.filter(&records);
        debug!(
            zone = %found_zone.name,
            total = records.len(),
            matched = matched.len(),
            "Records filtered"
        );
        Ok(matched)
    }
}
