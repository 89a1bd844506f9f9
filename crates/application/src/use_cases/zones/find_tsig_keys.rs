use std::sync::Arc;
use tracing::instrument;
use zone_manager_domain::{DomainError, TsigKey};

use crate::ports::ConfigurationRepository;

pub struct FindTsigKeysUseCase {
    config_repo: Arc<dyn ConfigurationRepository>,
}

impl FindTsigKeysUseCase {
    pub fn new(config_repo: Arc<dyn ConfigurationRepository>) -> Self {
        Self { config_repo }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<Vec<TsigKey>, DomainError> {
        self.config_repo.find_tsig_keys().await
    }
}
