pub mod data;
pub mod record_type;
pub mod values;

pub use data::{AData, AaaaData, MxData, RecordData, SoaData, SrvData, TargetData, TxtData};
pub use record_type::{RecordType, ZoneType};
pub use values::{FieldKind, FieldValue, PositionalData};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::DomainError;

/// TTL applied when a record does not carry one.
pub const DEFAULT_TTL: u32 = 300;

/// Marker for the zone apex in relative names.
pub const APEX: &str = "@";

/// What a dynamic update should do with a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Add,
    Delete,
    Replace,
    #[default]
    None,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Add => "ADD",
            Operation::Delete => "DELETE",
            Operation::Replace => "REPLACE",
            Operation::None => "NONE",
        };
        write!(f, "{}", s)
    }
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

/// A DNS resource record as seen by clients of the zone manager.
///
/// `name` is relative to the zone (`"www"`), the apex marker (`"@"`) or an
/// absolute name. For PTR records in reverse zones it holds the IP address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub name: String,
    #[serde(default = "default_ttl")]
    pub time_to_live: u32,
    #[serde(default)]
    pub operation: Operation,
    #[serde(flatten)]
    pub data: RecordData,
}

impl Record {
    pub fn new(name: impl Into<String>, data: RecordData) -> Self {
        Self {
            name: name.into(),
            time_to_live: DEFAULT_TTL,
            operation: Operation::None,
            data,
        }
    }

    /// Builds a record from its type and the ordered payload values.
    ///
    /// A missing TTL falls back to [`DEFAULT_TTL`].
    pub fn from_values(
        record_type: RecordType,
        name: impl Into<String>,
        time_to_live: Option<u32>,
        values: &[FieldValue],
    ) -> Result<Self, DomainError> {
        let data = RecordData::from_values(record_type, values)?;
        Ok(Self {
            name: name.into(),
            time_to_live: time_to_live.unwrap_or(DEFAULT_TTL),
            operation: Operation::None,
            data,
        })
    }

    pub fn with_ttl(mut self, time_to_live: u32) -> Self {
        self.time_to_live = time_to_live;
        self
    }

    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    pub fn record_type(&self) -> RecordType {
        self.data.record_type()
    }

    /// Serial number when this is an SOA record.
    pub fn soa_serial(&self) -> Option<i64> {
        match &self.data {
            RecordData::SOA(soa) => Some(soa.serial_number),
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.time_to_live, self.record_type())
    }
}

/// The SOA record of a record set, if any.
pub fn find_soa(records: &[Record]) -> Option<&SoaData> {
    records.iter().find_map(|r| match &r.data {
        RecordData::SOA(soa) => Some(soa),
        _ => None,
    })
}
