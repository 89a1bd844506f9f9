use std::sync::Arc;
use zone_manager_domain::Config;
use zone_manager_infrastructure::repositories::ConfigRepository;

pub struct Repositories {
    pub config: Arc<ConfigRepository>,
}

impl Repositories {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(ConfigRepository::new(config)),
        }
    }
}
