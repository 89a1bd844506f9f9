use serde::{Deserialize, Serialize};

/// Settings for talking to the backend name servers and for the zone cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Bound on every lookup, transfer and update exchange.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    /// Delay between cache startup and the cache becoming available.
    #[serde(default = "default_bootstrap_delay_secs")]
    pub bootstrap_delay_secs: u64,

    /// Refresh interval for zones whose SOA could not be read.
    #[serde(default = "default_refresh_secs")]
    pub default_refresh_secs: u64,
}

fn default_query_timeout_ms() -> u64 {
    5000
}

fn default_bootstrap_delay_secs() -> u64 {
    30
}

fn default_refresh_secs() -> u64 {
    3600
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            query_timeout_ms: default_query_timeout_ms(),
            bootstrap_delay_secs: default_bootstrap_delay_secs(),
            default_refresh_secs: default_refresh_secs(),
        }
    }
}
