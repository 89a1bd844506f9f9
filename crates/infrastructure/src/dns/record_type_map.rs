use hickory_proto::rr::RecordType as HickoryRecordType;
use zone_manager_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    /// Convert domain RecordType → hickory RecordType (for building queries)
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::CNAME => HickoryRecordType::CNAME,
            RecordType::MX => HickoryRecordType::MX,
            RecordType::NS => HickoryRecordType::NS,
            RecordType::PTR => HickoryRecordType::PTR,
            RecordType::SOA => HickoryRecordType::SOA,
            RecordType::SRV => HickoryRecordType::SRV,
            RecordType::TXT => HickoryRecordType::TXT,
            RecordType::ANY => HickoryRecordType::ANY,
        }
    }

    /// Convert hickory RecordType → domain RecordType (for transferred records)
    ///
    /// Returns `None` for types the zone manager does not model.
    pub fn from_hickory(hickory_type: HickoryRecordType) -> Option<RecordType> {
        match hickory_type {
            HickoryRecordType::A => Some(RecordType::A),
            HickoryRecordType::AAAA => Some(RecordType::AAAA),
            HickoryRecordType::CNAME => Some(RecordType::CNAME),
            HickoryRecordType::MX => Some(RecordType::MX),
            HickoryRecordType::NS => Some(RecordType::NS),
            HickoryRecordType::PTR => Some(RecordType::PTR),
            HickoryRecordType::SOA => Some(RecordType::SOA),
            HickoryRecordType::SRV => Some(RecordType::SRV),
            HickoryRecordType::TXT => Some(RecordType::TXT),
            HickoryRecordType::ANY => Some(RecordType::ANY),
            _ => None,
        }
    }

    pub fn is_supported(hickory_type: HickoryRecordType) -> bool {
        Self::from_hickory(hickory_type).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_bijective_for_modelled_types() {
        for rt in RecordType::all() {
            assert_eq!(RecordTypeMapper::from_hickory(RecordTypeMapper::to_hickory(*rt)), Some(*rt));
        }
    }

    #[test]
    fn test_unmodelled_types_are_unsupported() {
        assert!(!RecordTypeMapper::is_supported(HickoryRecordType::DNSKEY));
        assert!(!RecordTypeMapper::is_supported(HickoryRecordType::CAA));
        assert!(RecordTypeMapper::is_supported(HickoryRecordType::SRV));
    }
}
