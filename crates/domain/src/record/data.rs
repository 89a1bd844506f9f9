use serde::{Deserialize, Serialize};

use super::values::{FieldKind, FieldReader, FieldValue, PositionalData};
use super::RecordType;
use crate::DomainError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AData {
    #[serde(default)]
    pub ip_address: Option<String>,
}

impl PositionalData for AData {
    const TYPE_NAME: &'static str = "A";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[("ipAddress", FieldKind::Text)];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            ip_address: fields.text(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaaaData {
    #[serde(default)]
    pub ipv6_address: Option<String>,
}

impl PositionalData for AaaaData {
    const TYPE_NAME: &'static str = "AAAA";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[("ipv6Address", FieldKind::Text)];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            ipv6_address: fields.text(),
        }
    }
}

/// Payload shared by CNAME, NS and PTR.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetData {
    #[serde(default)]
    pub target: Option<String>,
}

impl PositionalData for TargetData {
    const TYPE_NAME: &'static str = "CNAME/NS/PTR";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[("target", FieldKind::Text)];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            target: fields.text(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MxData {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub priority: i32,
}

impl PositionalData for MxData {
    const TYPE_NAME: &'static str = "MX";
    const SHAPE: &'static [(&'static str, FieldKind)] =
        &[("target", FieldKind::Text), ("priority", FieldKind::Int)];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            target: fields.text(),
            priority: fields.int(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoaData {
    #[serde(default, rename = "minimumTTL")]
    pub minimum_ttl: i64,
    #[serde(default)]
    pub expire_interval: i64,
    #[serde(default)]
    pub retry_interval: i64,
    #[serde(default)]
    pub refresh_interval: i64,
    #[serde(default)]
    pub serial_number: i64,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub master_name_server: Option<String>,
}

impl PositionalData for SoaData {
    const TYPE_NAME: &'static str = "SOA";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[
        ("minimumTTL", FieldKind::Long),
        ("expireInterval", FieldKind::Long),
        ("retryInterval", FieldKind::Long),
        ("refreshInterval", FieldKind::Long),
        ("serialNumber", FieldKind::Long),
        ("emailAddress", FieldKind::Text),
        ("masterNameServer", FieldKind::Text),
    ];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            minimum_ttl: fields.long(),
            expire_interval: fields.long(),
            retry_interval: fields.long(),
            refresh_interval: fields.long(),
            serial_number: fields.long(),
            email_address: fields.text(),
            master_name_server: fields.text(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrvData {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub port: i32,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub priority: i32,
}

impl PositionalData for SrvData {
    const TYPE_NAME: &'static str = "SRV";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[
        ("target", FieldKind::Text),
        ("port", FieldKind::Int),
        ("weight", FieldKind::Int),
        ("priority", FieldKind::Int),
    ];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            target: fields.text(),
            port: fields.int(),
            weight: fields.int(),
            priority: fields.int(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxtData {
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

impl PositionalData for TxtData {
    const TYPE_NAME: &'static str = "TXT";
    const SHAPE: &'static [(&'static str, FieldKind)] = &[("values", FieldKind::TextList)];

    fn read(fields: &mut FieldReader<'_>) -> Self {
        Self {
            values: fields.text_list(),
        }
    }
}

/// Type-specific record payload, tagged by record type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecordData {
    A(AData),
    AAAA(AaaaData),
    CNAME(TargetData),
    MX(MxData),
    NS(TargetData),
    PTR(TargetData),
    SOA(SoaData),
    SRV(SrvData),
    TXT(TxtData),
}

impl RecordData {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordData::A(_) => RecordType::A,
            RecordData::AAAA(_) => RecordType::AAAA,
            RecordData::CNAME(_) => RecordType::CNAME,
            RecordData::MX(_) => RecordType::MX,
            RecordData::NS(_) => RecordType::NS,
            RecordData::PTR(_) => RecordType::PTR,
            RecordData::SOA(_) => RecordType::SOA,
            RecordData::SRV(_) => RecordType::SRV,
            RecordData::TXT(_) => RecordType::TXT,
        }
    }

    /// Builds the payload for `record_type` from its ordered field values.
    pub fn from_values(record_type: RecordType, values: &[FieldValue]) -> Result<Self, DomainError> {
        Ok(match record_type {
            RecordType::A => RecordData::A(AData::from_values(values)?),
            RecordType::AAAA => RecordData::AAAA(AaaaData::from_values(values)?),
            RecordType::CNAME => RecordData::CNAME(TargetData::from_values(values)?),
            RecordType::MX => RecordData::MX(MxData::from_values(values)?),
            RecordType::NS => RecordData::NS(TargetData::from_values(values)?),
            RecordType::PTR => RecordData::PTR(TargetData::from_values(values)?),
            RecordType::SOA => RecordData::SOA(SoaData::from_values(values)?),
            RecordType::SRV => RecordData::SRV(SrvData::from_values(values)?),
            RecordType::TXT => RecordData::TXT(TxtData::from_values(values)?),
            RecordType::ANY => {
                return Err(DomainError::InvalidRecordData(
                    "ANY has no record payload".to_string(),
                ))
            }
        })
    }

    pub fn a(ip_address: impl Into<String>) -> Self {
        RecordData::A(AData {
            ip_address: Some(ip_address.into()),
        })
    }

    pub fn aaaa(ipv6_address: impl Into<String>) -> Self {
        RecordData::AAAA(AaaaData {
            ipv6_address: Some(ipv6_address.into()),
        })
    }

    pub fn cname(target: impl Into<String>) -> Self {
        RecordData::CNAME(TargetData {
            target: Some(target.into()),
        })
    }

    pub fn ns(target: impl Into<String>) -> Self {
        RecordData::NS(TargetData {
            target: Some(target.into()),
        })
    }

    pub fn ptr(target: impl Into<String>) -> Self {
        RecordData::PTR(TargetData {
            target: Some(target.into()),
        })
    }

    pub fn mx(target: impl Into<String>, priority: i32) -> Self {
        RecordData::MX(MxData {
            target: Some(target.into()),
            priority,
        })
    }

    pub fn srv(target: impl Into<String>, port: i32, weight: i32, priority: i32) -> Self {
        RecordData::SRV(SrvData {
            target: Some(target.into()),
            port,
            weight,
            priority,
        })
    }

    pub fn txt<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        RecordData::TXT(TxtData {
            values: Some(values.into_iter().map(Into::into).collect()),
        })
    }

    /// The host name the record points at, if its type has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            RecordData::CNAME(d) | RecordData::NS(d) | RecordData::PTR(d) => d.target.as_deref(),
            RecordData::MX(d) => d.target.as_deref(),
            RecordData::SRV(d) => d.target.as_deref(),
            _ => None,
        }
    }
}
