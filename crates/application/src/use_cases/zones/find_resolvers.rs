use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::{DomainError, Resolver};

use crate::ports::ConfigurationRepository;

pub struct FindResolversUseCase {
    config_repo: Arc<dyn ConfigurationRepository>,
}

impl FindResolversUseCase {
    pub fn new(config_repo: Arc<dyn ConfigurationRepository>) -> Self {
        Self { config_repo }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<Vec<Resolver>, DomainError> {
        self.config_repo.find_resolvers().await
    }
}
