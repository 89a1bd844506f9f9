use std::sync::Arc;
use tracing::{info, instrument, warn};
use zone_manager_domain::{DomainError, Record};

use crate::ports::ZoneCachePort;
use crate::services::{into_service_error, ZoneLocator};

pub struct ProcessRecordOperationsUseCase {
    locator: Arc<ZoneLocator>,
    cache: Arc<dyn ZoneCachePort>,
}

impl ProcessRecordOperationsUseCase {
    pub fn new(locator: Arc<ZoneLocator>, cache: Arc<dyn ZoneCachePort>) -> Self {
        Self { locator, cache }
    }

    /// Applies the records' operations as one dynamic update.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The update was accepted; the zone is flagged and the
    ///   cache refreshed
    /// * `Ok(false)` - The server rejected the update
    /// * `Err(DomainError)` - Unknown view/zone, bad record, or transport failure
    #[instrument(skip(self, records), fields(count = records.len()))]
    pub async fn execute(
        &self,
        view: &str,
        zone: &str,
        records: &[Record],
    ) -> Result<bool, DomainError> {
        let (found_zone, executor) = self.locator.executor(view, zone).await?;

        let accepted = executor
            .process_record_operations(records)
            .await
            .map_err(into_service_error)?;

        if accepted {
            self.cache.flag_for_refresh(&found_zone.identity());
            self.cache.refresh().await;
            info!(zone = %found_zone.name, count = records.len(), "Record operations applied");
        } else {
            warn!(zone = %found_zone.name, "Record operations rejected by name server");
        }

        Ok(accepted)
    }
}
