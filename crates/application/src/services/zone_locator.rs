use std::sync::Arc;
use tracing::debug;
use zone_manager_domain::{DomainError, View, Zone};

use crate::ports::{ConfigurationRepository, ZoneExecutor, ZoneExecutorFactory};

/// Resolves `(view, zone)` names against the configuration and binds
/// executors to the result. Missing names surface as not-found errors.
pub struct ZoneLocator {
    config_repo: Arc<dyn ConfigurationRepository>,
    executor_factory: Arc<dyn ZoneExecutorFactory>,
}

impl ZoneLocator {
    pub fn new(
        config_repo: Arc<dyn ConfigurationRepository>,
        executor_factory: Arc<dyn ZoneExecutorFactory>,
    ) -> Self {
        Self {
            config_repo,
            executor_factory,
        }
    }

    pub fn config_repo(&self) -> &Arc<dyn ConfigurationRepository> {
        &self.config_repo
    }

    pub async fn require_view(&self, view: &str) -> Result<View, DomainError> {
        self.config_repo
            .find_view(view)
            .await?
            .ok_or_else(|| DomainError::ViewNotFound(view.to_string()))
    }

    pub async fn require_zone(&self, view: &str, zone: &str) -> Result<(View, Zone), DomainError> {
        let found_view = self.require_view(view).await?;
        let found_zone = self
            .config_repo
            .find_zone(view, zone)
            .await?
            .ok_or_else(|| DomainError::zone_not_found(view, zone))?;
        Ok((found_view, found_zone))
    }

    /// Looks up the zone and creates an executor for it.
    pub async fn executor(
        &self,
        view: &str,
        zone: &str,
    ) -> Result<(Zone, Arc<dyn ZoneExecutor>), DomainError> {
        let (found_view, found_zone) = self.require_zone(view, zone).await?;
        let executor = self.bind(&found_view, &found_zone).await?;
        Ok((found_zone, executor))
    }

    /// Creates an executor for an already resolved zone.
    pub async fn bind(&self, view: &View, zone: &Zone) -> Result<Arc<dyn ZoneExecutor>, DomainError> {
        debug!(
            view = %view.name,
            zone = %zone.name,
            resolvers = view.resolvers.len(),
            "Creating zone executor"
        );
        self.executor_factory.create(view, zone).await
    }
}

/// Maps failures of the DNS layer to the generic service error, keeping the
/// categories callers handle distinctly.
pub fn into_service_error(error: DomainError) -> DomainError {
    match error {
        DomainError::ViewNotFound(_)
        | DomainError::ZoneNotFound { .. }
        | DomainError::TsigKeyNotFound(_)
        | DomainError::InvalidRecordData(_)
        | DomainError::Conversion { .. }
        | DomainError::Service(_) => error,
        other => DomainError::Service(other.to_string()),
    }
}
