use std::sync::Arc;
use zone_manager_application::services::ZoneLocator;
use zone_manager_application::use_cases::{
    FindResolversUseCase, FindTsigKeysUseCase, FindViewUseCase, FindZoneNamesUseCase,
    FindZoneUseCase,
};

use super::{Repositories, ZoneServices};

/// Read-only use cases the binary reports on at startup.
pub struct UseCases {
    pub find_resolvers: Arc<FindResolversUseCase>,
    pub find_tsig_keys: Arc<FindTsigKeysUseCase>,
    pub find_view: Arc<FindViewUseCase>,
    pub find_zone_names: Arc<FindZoneNamesUseCase>,
    pub find_zone: Arc<FindZoneUseCase>,
}

impl UseCases {
    pub fn new(repos: &Repositories, services: &ZoneServices) -> Self {
        let locator = Arc::new(ZoneLocator::new(
            repos.config.clone(),
            services.executor_factory.clone(),
        ));

        Self {
            find_resolvers: Arc::new(FindResolversUseCase::new(repos.config.clone())),
            find_tsig_keys: Arc::new(FindTsigKeysUseCase::new(repos.config.clone())),
            find_view: Arc::new(FindViewUseCase::new(locator.clone())),
            find_zone_names: Arc::new(FindZoneNamesUseCase::new(locator.clone())),
            find_zone: Arc::new(FindZoneUseCase::new(locator, services.cache.clone())),
        }
    }
}
