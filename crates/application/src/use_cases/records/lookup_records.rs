use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::{DomainError, Record, RecordType};

use crate::services::{into_service_error, ZoneLocator};

/// Uncached protocol lookup of one name within a zone.
pub struct LookupRecordsUseCase {
    locator: Arc<ZoneLocator>,
}

impl LookupRecordsUseCase {
    pub fn new(locator: Arc<ZoneLocator>) -> Self {
        Self { locator }
    }

    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        view: &str,
        zone: &str,
        record_type: Option<RecordType>,
        name: &str,
    ) -> Result<Vec<Record>, DomainError> {
        let (_, executor) = self.locator.executor(view, zone).await?;
        executor
            .lookup(record_type, name)
            .await
            .map_err(into_service_error)
    }
}
