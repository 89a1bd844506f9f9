use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::{Record, RecordType, ZoneType};

/// HMAC algorithms accepted for TSIG keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TsigAlgorithm {
    #[serde(rename = "hmac-md5")]
    HmacMd5,
    #[serde(rename = "hmac-sha1")]
    HmacSha1,
    #[serde(rename = "hmac-sha224")]
    HmacSha224,
    #[serde(rename = "hmac-sha256")]
    HmacSha256,
    #[serde(rename = "hmac-sha384")]
    HmacSha384,
    #[serde(rename = "hmac-sha512")]
    HmacSha512,
}

impl TsigAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            TsigAlgorithm::HmacMd5 => "hmac-md5",
            TsigAlgorithm::HmacSha1 => "hmac-sha1",
            TsigAlgorithm::HmacSha224 => "hmac-sha224",
            TsigAlgorithm::HmacSha256 => "hmac-sha256",
            TsigAlgorithm::HmacSha384 => "hmac-sha384",
            TsigAlgorithm::HmacSha512 => "hmac-sha512",
        }
    }
}

impl fmt::Display for TsigAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared-secret key used to sign DNS messages.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsigKey {
    pub name: String,
    pub algorithm: TsigAlgorithm,
    /// Base64-encoded secret.
    pub secret: String,
}

// The secret stays out of logs.
impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

fn default_dns_port() -> u16 {
    53
}

/// A name server the zone manager talks to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolver {
    /// Host name or IP address.
    pub address: String,
    /// Local address to bind outgoing sockets to.
    #[serde(default)]
    pub local_address: Option<String>,
    #[serde(default = "default_dns_port")]
    pub port: u16,
    /// Name of the TSIG key used when the zone has none for an operation.
    #[serde(default)]
    pub tsig_key: Option<String>,
}

impl Resolver {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            local_address: None,
            port,
            tsig_key: None,
        }
    }
}

impl fmt::Display for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.address.contains(':') {
            write!(f, "[{}]:{}", self.address, self.port)
        } else {
            write!(f, "{}:{}", self.address, self.port)
        }
    }
}

/// A named set of resolvers, tried in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    #[serde(default)]
    pub resolvers: Vec<Resolver>,
}

/// A zone managed inside a view. Keys are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(rename = "type", default)]
    pub zone_type: ZoneType,
    pub view: String,
    #[serde(default)]
    pub query_key: Option<String>,
    #[serde(default)]
    pub transfer_key: Option<String>,
    #[serde(default)]
    pub update_key: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<Record>,
}

impl Zone {
    pub fn new(name: impl Into<String>, zone_type: ZoneType, view: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            zone_type,
            view: view.into(),
            query_key: None,
            transfer_key: None,
            update_key: None,
            records: Vec::new(),
        }
    }

    pub fn supported_record_types(&self) -> Vec<RecordType> {
        self.zone_type.supported_record_types()
    }

    pub fn identity(&self) -> ZoneIdentity {
        ZoneIdentity::new(&self.view, &self.name)
    }
}

/// Normalizes a zone name for comparison: lowercase, no trailing dot.
pub fn normalize_zone_name(name: &str) -> String {
    name.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Key of a cached or scheduled zone: `(view, zone)`.
///
/// [`ZoneIdentity::none`] is a sentinel that never names a real zone; the
/// cache uses it for its bootstrap task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneIdentity {
    view: String,
    zone: String,
}

impl ZoneIdentity {
    pub fn new(view: &str, zone: &str) -> Self {
        Self {
            view: view.to_string(),
            zone: normalize_zone_name(zone),
        }
    }

    pub fn none() -> Self {
        Self {
            view: String::new(),
            zone: String::new(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.view.is_empty() && self.zone.is_empty()
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }
}

impl fmt::Display for ZoneIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "{}/{}", self.view, self.zone)
        }
    }
}
