use serde::{Deserialize, Serialize};

/// NOTIFY listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// UDP port; `0` lets the OS pick one.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Upper bound on sending a NOTIFY response.
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,

    /// Maximum number of NOTIFY datagrams handled concurrently.
    #[serde(default = "default_threads")]
    pub threads: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    53
}

fn default_socket_timeout_ms() -> u64 {
    1000
}

fn default_threads() -> usize {
    4
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            socket_timeout_ms: default_socket_timeout_ms(),
            threads: default_threads(),
        }
    }
}
