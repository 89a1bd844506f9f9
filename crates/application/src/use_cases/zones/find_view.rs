use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::{DomainError, View};

use crate::services::ZoneLocator;

pub struct FindViewUseCase {
    locator: Arc<ZoneLocator>,
}

impl FindViewUseCase {
    pub fn new(locator: Arc<ZoneLocator>) -> Self {
        Self { locator }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, view: &str) -> Result<View, DomainError> {
        self.locator.require_view(view).await
    }
}
