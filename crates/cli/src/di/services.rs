use std::sync::Arc;
use std::time::Duration;
use zone_manager_infrastructure::cache::{ZoneCache, ZoneCacheSettings};
use zone_manager_infrastructure::dns::HickoryExecutorFactory;

use super::Repositories;

pub struct ZoneServices {
    pub executor_factory: Arc<HickoryExecutorFactory>,
    pub cache: Arc<ZoneCache>,
}

impl ZoneServices {
    pub fn new(repos: &Repositories) -> Self {
        let config = repos.config.current();

        let executor_factory = Arc::new(HickoryExecutorFactory::new(
            repos.config.clone(),
            Duration::from_millis(config.dns.query_timeout_ms),
        ));

        let cache = ZoneCache::new(
            repos.config.clone(),
            executor_factory.clone(),
            ZoneCacheSettings {
                default_refresh: Duration::from_secs(config.dns.default_refresh_secs),
                bootstrap_delay: Duration::from_secs(config.dns.bootstrap_delay_secs),
                notify: Some(config.notify.clone()),
            },
        );

        Self {
            executor_factory,
            cache,
        }
    }
}
