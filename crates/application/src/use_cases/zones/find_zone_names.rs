use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::DomainError;

use crate::services::ZoneLocator;

pub struct FindZoneNamesUseCase {
    locator: Arc<ZoneLocator>,
}

impl FindZoneNamesUseCase {
    pub fn new(locator: Arc<ZoneLocator>) -> Self {
        Self { locator }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, view: &str) -> Result<Vec<String>, DomainError> {
        self.locator.require_view(view).await?;
        let zones = self.locator.config_repo().find_zones(view).await?;
        Ok(zones.into_iter().map(|z| z.name).collect())
    }
}
