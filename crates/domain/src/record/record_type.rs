use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Record types managed by the zone manager.
///
/// `ANY` never appears on a stored record; it is only used as a query or
/// filter wildcard.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecordType {
    A,
    AAAA,
    CNAME,
    MX,
    NS,
    PTR,
    SOA,
    SRV,
    TXT,
    ANY,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
            RecordType::CNAME => "CNAME",
            RecordType::MX => "MX",
            RecordType::NS => "NS",
            RecordType::PTR => "PTR",
            RecordType::SOA => "SOA",
            RecordType::SRV => "SRV",
            RecordType::TXT => "TXT",
            RecordType::ANY => "ANY",
        }
    }

    /// All types, `ANY` included.
    pub fn all() -> &'static [RecordType] {
        &[
            RecordType::A,
            RecordType::AAAA,
            RecordType::CNAME,
            RecordType::MX,
            RecordType::NS,
            RecordType::PTR,
            RecordType::SOA,
            RecordType::SRV,
            RecordType::TXT,
            RecordType::ANY,
        ]
    }

    /// Whether the type may live in a forward zone.
    pub fn is_forward(&self) -> bool {
        !matches!(self, RecordType::PTR)
    }

    /// Whether the type may live in a reverse (`in-addr.arpa` / `ip6.arpa`) zone.
    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            RecordType::CNAME
                | RecordType::NS
                | RecordType::PTR
                | RecordType::SOA
                | RecordType::TXT
                | RecordType::ANY
        )
    }

    /// `ANY` on either side matches everything.
    pub fn matches(&self, other: RecordType) -> bool {
        *self == RecordType::ANY || other == RecordType::ANY || *self == other
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordType::all()
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidRecordData(format!("Unknown record type: {}", s)))
    }
}

/// Which half of the DNS namespace a zone serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneType {
    #[default]
    Forward,
    Reverse,
    Both,
}

impl ZoneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Forward => "forward",
            ZoneType::Reverse => "reverse",
            ZoneType::Both => "both",
        }
    }

    pub fn supports(&self, record_type: RecordType) -> bool {
        match self {
            ZoneType::Forward => record_type.is_forward(),
            ZoneType::Reverse => record_type.is_reverse(),
            ZoneType::Both => true,
        }
    }

    /// Concrete record types (no `ANY`) a zone of this type can hold.
    pub fn supported_record_types(&self) -> Vec<RecordType> {
        RecordType::all()
            .iter()
            .copied()
            .filter(|t| *t != RecordType::ANY && self.supports(*t))
            .collect()
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("aaaa".parse::<RecordType>().unwrap(), RecordType::AAAA);
        assert_eq!(" Mx ".parse::<RecordType>().unwrap(), RecordType::MX);
        assert!("NAPTR".parse::<RecordType>().is_err());
    }

    #[test]
    fn test_any_matches_everything() {
        assert!(RecordType::ANY.matches(RecordType::SRV));
        assert!(RecordType::TXT.matches(RecordType::ANY));
        assert!(!RecordType::A.matches(RecordType::AAAA));
    }

    #[test]
    fn test_zone_type_filters_supported_types() {
        let forward = ZoneType::Forward.supported_record_types();
        assert!(forward.contains(&RecordType::A));
        assert!(forward.contains(&RecordType::SOA));
        assert!(!forward.contains(&RecordType::PTR));

        let reverse = ZoneType::Reverse.supported_record_types();
        assert!(reverse.contains(&RecordType::PTR));
        assert!(reverse.contains(&RecordType::NS));
        assert!(!reverse.contains(&RecordType::A));
        assert!(!reverse.contains(&RecordType::SRV));

        let both = ZoneType::Both.supported_record_types();
        assert_eq!(both.len(), RecordType::all().len() - 1);
        assert!(!both.contains(&RecordType::ANY));
    }
}
