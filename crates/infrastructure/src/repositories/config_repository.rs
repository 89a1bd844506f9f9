use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use zone_manager_application::ports::ConfigurationRepository;
use zone_manager_domain::{
    normalize_zone_name, Config, ConfigError, DomainError, Resolver, TsigKey, View, Zone,
};

/// Serves views, zones, resolvers and keys from the loaded configuration.
///
/// The configuration is swapped wholesale on [`ConfigRepository::reload`];
/// readers always see one consistent snapshot.
pub struct ConfigRepository {
    config: ArcSwap<Config>,
}

impl ConfigRepository {
    pub fn new(config: Config) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
        }
    }

    pub fn current(&self) -> Arc<Config> {
        self.config.load_full()
    }

    /// Validates and installs a new configuration. The old one stays in
    /// place when validation fails.
    pub fn reload(&self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        let views = config.views.len();
        self.config.store(Arc::new(config));
        info!(views = views, "Configuration reloaded");
        Ok(())
    }
}

#[async_trait]
impl ConfigurationRepository for ConfigRepository {
    async fn find_view(&self, view: &str) -> Result<Option<View>, DomainError> {
        let config = self.config.load();
        Ok(config
            .views
            .iter()
            .find(|v| v.name == view)
            .map(|v| v.to_view()))
    }

    async fn find_views(&self) -> Result<Vec<View>, DomainError> {
        Ok(self.config.load().views.iter().map(|v| v.to_view()).collect())
    }

    async fn find_zone(&self, view: &str, zone: &str) -> Result<Option<Zone>, DomainError> {
        let config = self.config.load();
        let wanted = normalize_zone_name(zone);
        let found = config
            .views
            .iter()
            .find(|v| v.name == view)
            .and_then(|v| {
                v.to_zones()
                    .into_iter()
                    .find(|z| normalize_zone_name(&z.name) == wanted)
            });

        debug!(view = %view, zone = %zone, found = found.is_some(), "Zone lookup");
        Ok(found)
    }

    async fn find_zones(&self, view: &str) -> Result<Vec<Zone>, DomainError> {
        let config = self.config.load();
        config
            .views
            .iter()
            .find(|v| v.name == view)
            .map(|v| v.to_zones())
            .ok_or_else(|| DomainError::ViewNotFound(view.to_string()))
    }

    async fn find_resolvers(&self) -> Result<Vec<Resolver>, DomainError> {
        let config = self.config.load();
        let mut resolvers: Vec<Resolver> = Vec::new();
        for resolver in config.views.iter().flat_map(|v| v.resolvers.iter()) {
            if !resolvers.contains(resolver) {
                resolvers.push(resolver.clone());
            }
        }
        Ok(resolvers)
    }

    async fn find_tsig_keys(&self) -> Result<Vec<TsigKey>, DomainError> {
        Ok(self.config.load().tsig_keys.clone())
    }

    async fn find_tsig_key(&self, name: &str) -> Result<Option<TsigKey>, DomainError> {
        Ok(self
            .config
            .load()
            .tsig_keys
            .iter()
            .find(|k| k.name == name)
            .cloned())
    }
}
