use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use super::{ConfigError, DnsConfig, LoggingConfig, NotifyConfig, ViewConfig};
use crate::zone::{normalize_zone_name, TsigKey};

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub notify_port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub notify: NotifyConfig,

    #[serde(default)]
    pub dns: DnsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub tsig_keys: Vec<TsigKey>,

    #[serde(default)]
    pub views: Vec<ViewConfig>,
}

impl Config {
    /// Loads the configuration file (defaults when `path` is `None`) and
    /// applies the CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.notify_port {
            self.notify.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.notify.bind_address = bind;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notify.threads == 0 {
            return Err(ConfigError::Validation(
                "notify.threads must be at least 1".to_string(),
            ));
        }
        if self.dns.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "dns.query_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.dns.default_refresh_secs == 0 {
            return Err(ConfigError::Validation(
                "dns.default_refresh_secs must be greater than 0".to_string(),
            ));
        }

        let mut key_names = HashSet::new();
        for key in &self.tsig_keys {
            if key.secret.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "TSIG key '{}' has an empty secret",
                    key.name
                )));
            }
            if !key_names.insert(key.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate TSIG key '{}'",
                    key.name
                )));
            }
        }

        let mut view_names = HashSet::new();
        for view in &self.views {
            if !view_names.insert(view.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate view '{}'",
                    view.name
                )));
            }
            if !view.zones.is_empty() && view.resolvers.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "View '{}' has zones but no resolvers",
                    view.name
                )));
            }

            let mut zone_names = HashSet::new();
            for zone in &view.zones {
                if !zone_names.insert(normalize_zone_name(&zone.name)) {
                    return Err(ConfigError::Validation(format!(
                        "Duplicate zone '{}' in view '{}'",
                        zone.name, view.name
                    )));
                }
            }

            if let Some(missing) = view.referenced_keys().find(|k| !key_names.contains(k)) {
                return Err(ConfigError::Validation(format!(
                    "View '{}' references unknown TSIG key '{}'",
                    view.name, missing
                )));
            }
        }

        Ok(())
    }
}
