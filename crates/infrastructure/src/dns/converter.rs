//! Mapping between domain records and `hickory-proto` resource records.
//!
//! Names are absolutized on the way to the wire and relativized on the way
//! back. Targets outside the zone keep their absolute form so that they
//! survive a round trip. In reverse zones a PTR record's name is the IP
//! address it describes whenever the owner labels spell a full address.

use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record as WireRecord};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use tracing::warn;
use zone_manager_domain::record::{AData, AaaaData, MxData, SrvData, TargetData, TxtData};
use zone_manager_domain::{DomainError, Record, RecordData, SoaData, ZoneNameResolver};

pub struct RecordConverter {
    names: ZoneNameResolver,
}

impl RecordConverter {
    pub fn new(zone_name: &str) -> Self {
        Self {
            names: ZoneNameResolver::new(zone_name),
        }
    }

    pub fn names(&self) -> &ZoneNameResolver {
        &self.names
    }

    /// Converts one record for the wire. With `ignore_conversion_error` a
    /// failure is logged and yields `Ok(None)`.
    pub fn to_wire(
        &self,
        record: &Record,
        ignore_conversion_error: bool,
    ) -> Result<Option<WireRecord>, DomainError> {
        match self.convert_to_wire(record) {
            Ok(wire) => Ok(Some(wire)),
            Err(e) if ignore_conversion_error => {
                warn!(record = %record, error = %e, "Skipping record that cannot be converted");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn to_wire_list(
        &self,
        records: &[Record],
        ignore_conversion_error: bool,
    ) -> Result<Vec<WireRecord>, DomainError> {
        let mut converted = Vec::with_capacity(records.len());
        for record in records {
            if let Some(wire) = self.to_wire(record, ignore_conversion_error)? {
                converted.push(wire);
            }
        }
        Ok(converted)
    }

    /// Converts one wire record to the domain model. With
    /// `ignore_conversion_error` a failure is logged and yields `Ok(None)`.
    pub fn to_domain(
        &self,
        wire: &WireRecord,
        ignore_conversion_error: bool,
    ) -> Result<Option<Record>, DomainError> {
        match self.convert_to_domain(wire) {
            Ok(record) => Ok(Some(record)),
            Err(e) if ignore_conversion_error => {
                warn!(
                    name = %wire.name(),
                    record_type = %wire.record_type(),
                    error = %e,
                    "Skipping record that cannot be converted"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn to_domain_list(
        &self,
        wires: &[WireRecord],
        ignore_conversion_error: bool,
    ) -> Result<Vec<Record>, DomainError> {
        let mut converted = Vec::with_capacity(wires.len());
        for wire in wires {
            if let Some(record) = self.to_domain(wire, ignore_conversion_error)? {
                converted.push(record);
            }
        }
        Ok(converted)
    }

    /// Strict single-record conversion for the wire.
    pub fn convert_to_wire(&self, record: &Record) -> Result<WireRecord, DomainError> {
        let fail = |reason: String| DomainError::Conversion {
            name: record.name.clone(),
            record_type: record.record_type().to_string(),
            reason,
        };

        let owner = match &record.data {
            RecordData::PTR(_) if record.name.parse::<IpAddr>().is_ok() => {
                let tets = self.names.get_reverse_tets(&record.name).map_err(|e| fail(e.to_string()))?;
                self.absolute_name(&tets).map_err(fail)?
            }
            _ => self.absolute_name(&record.name).map_err(fail)?,
        };

        let rdata = match &record.data {
            RecordData::A(a) => {
                let text = required(&a.ip_address, "ipAddress").map_err(fail)?;
                let ip = Ipv4Addr::from_str(text)
                    .map_err(|_| fail(format!("'{}' is not an IPv4 address", text)))?;
                RData::A(A(ip))
            }
            RecordData::AAAA(aaaa) => {
                let text = required(&aaaa.ipv6_address, "ipv6Address").map_err(fail)?;
                let ip = Ipv6Addr::from_str(text)
                    .map_err(|_| fail(format!("'{}' is not an IPv6 address", text)))?;
                RData::AAAA(AAAA(ip))
            }
            RecordData::CNAME(d) => RData::CNAME(CNAME(self.target_name(d).map_err(fail)?)),
            RecordData::NS(d) => RData::NS(NS(self.target_name(d).map_err(fail)?)),
            RecordData::PTR(d) => RData::PTR(PTR(self.target_name(d).map_err(fail)?)),
            RecordData::MX(mx) => {
                let target = required(&mx.target, "target").map_err(fail)?;
                RData::MX(MX::new(
                    to_u16(mx.priority, "priority").map_err(fail)?,
                    self.absolute_name(target).map_err(fail)?,
                ))
            }
            RecordData::SRV(srv) => {
                let target = required(&srv.target, "target").map_err(fail)?;
                RData::SRV(SRV::new(
                    to_u16(srv.priority, "priority").map_err(fail)?,
                    to_u16(srv.weight, "weight").map_err(fail)?,
                    to_u16(srv.port, "port").map_err(fail)?,
                    self.absolute_name(target).map_err(fail)?,
                ))
            }
            RecordData::TXT(txt) => RData::TXT(TXT::new(txt.values.clone().unwrap_or_default())),
            RecordData::SOA(soa) => RData::SOA(self.soa_to_wire(soa).map_err(fail)?),
        };

        Ok(WireRecord::from_rdata(owner, record.time_to_live, rdata))
    }

    fn soa_to_wire(&self, soa: &SoaData) -> Result<SOA, String> {
        let master = required(&soa.master_name_server, "masterNameServer")?;
        let email = required(&soa.email_address, "emailAddress")?;
        let mailbox = email.replacen('@', ".", 1);

        Ok(SOA::new(
            self.absolute_name(master)?,
            self.absolute_name(&mailbox)?,
            u32::try_from(soa.serial_number)
                .map_err(|_| format!("serialNumber {} out of range", soa.serial_number))?,
            to_i32(soa.refresh_interval, "refreshInterval")?,
            to_i32(soa.retry_interval, "retryInterval")?,
            to_i32(soa.expire_interval, "expireInterval")?,
            u32::try_from(soa.minimum_ttl)
                .map_err(|_| format!("minimumTTL {} out of range", soa.minimum_ttl))?,
        ))
    }

    /// Strict single-record conversion to the domain model.
    pub fn convert_to_domain(&self, wire: &WireRecord) -> Result<Record, DomainError> {
        let owner = wire.name().to_utf8();
        let fail = |reason: String| DomainError::Conversion {
            name: owner.clone(),
            record_type: wire.record_type().to_string(),
            reason,
        };

        let mut name = self.names.relativize(&owner);
        let data = match wire.data() {
            RData::A(a) => RecordData::A(AData {
                ip_address: Some(a.0.to_string()),
            }),
            RData::AAAA(aaaa) => RecordData::AAAA(AaaaData {
                ipv6_address: Some(aaaa.0.to_string()),
            }),
            RData::CNAME(cname) => RecordData::CNAME(self.target_data(&cname.0)),
            RData::NS(ns) => RecordData::NS(self.target_data(&ns.0)),
            RData::PTR(ptr) => {
                if let Ok(ip) = self.names.get_ip_address(&name) {
                    name = ip;
                }
                RecordData::PTR(self.target_data(&ptr.0))
            }
            RData::MX(mx) => RecordData::MX(MxData {
                target: Some(self.target_to_domain(mx.exchange())),
                priority: i32::from(mx.preference()),
            }),
            RData::SRV(srv) => RecordData::SRV(SrvData {
                target: Some(self.target_to_domain(srv.target())),
                port: i32::from(srv.port()),
                weight: i32::from(srv.weight()),
                priority: i32::from(srv.priority()),
            }),
            RData::TXT(txt) => RecordData::TXT(TxtData {
                values: Some(
                    txt.txt_data()
                        .iter()
                        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                        .collect(),
                ),
            }),
            RData::SOA(soa) => RecordData::SOA(SoaData {
                minimum_ttl: i64::from(soa.minimum()),
                expire_interval: i64::from(soa.expire()),
                retry_interval: i64::from(soa.retry()),
                refresh_interval: i64::from(soa.refresh()),
                serial_number: i64::from(soa.serial()),
                email_address: Some(self.target_to_domain(soa.rname())),
                master_name_server: Some(self.target_to_domain(soa.mname())),
            }),
            _ => return Err(fail("unsupported record type".to_string())),
        };

        Ok(Record::new(name, data).with_ttl(wire.ttl()))
    }

    fn absolute_name(&self, name: &str) -> Result<Name, String> {
        let absolute = self.names.absolutize(name);
        Name::from_str(&absolute).map_err(|e| format!("invalid name '{}': {}", absolute, e))
    }

    fn target_name(&self, data: &TargetData) -> Result<Name, String> {
        self.absolute_name(required(&data.target, "target")?)
    }

    fn target_data(&self, target: &Name) -> TargetData {
        TargetData {
            target: Some(self.target_to_domain(target)),
        }
    }

    /// In-zone targets become relative; others stay absolute.
    fn target_to_domain(&self, target: &Name) -> String {
        let absolute = target.to_utf8();
        if self.names.contains(&absolute) {
            self.names.relativize(&absolute)
        } else {
            absolute
        }
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| format!("missing {}", field))
}

fn to_u16(value: i32, field: &str) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("{} {} out of range", field, value))
}

fn to_i32(value: i64, field: &str) -> Result<i32, String> {
    i32::try_from(value).map_err(|_| format!("{} {} out of range", field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::rr::rdata::HINFO;
    use zone_manager_domain::{FieldValue, RecordType};

    fn round_trip(converter: &RecordConverter, record: &Record) -> Record {
        let wire = converter.to_wire(record, false).unwrap().unwrap();
        converter.to_domain(&wire, false).unwrap().unwrap()
    }

    #[test]
    fn test_forward_records_round_trip() {
        let converter = RecordConverter::new("zone.test");
        let records = vec![
            Record::new("www", RecordData::a("10.0.0.1")),
            Record::new("www", RecordData::aaaa("2001:db8::1")),
            Record::new("alias", RecordData::cname("www")),
            Record::new("@", RecordData::ns("ns1.provider.test.")),
            Record::new("@", RecordData::mx("mail", 10)).with_ttl(3600),
            Record::new("_sip._tcp", RecordData::srv("sip", 5060, 5, 10)),
            Record::new("@", RecordData::txt(["v=spf1 -all"])),
        ];

        for record in &records {
            assert_eq!(&round_trip(&converter, record), record);
        }
    }

    #[test]
    fn test_names_are_absolutized_on_the_wire() {
        let converter = RecordConverter::new("zone.test");
        let wire = converter
            .to_wire(&Record::new("alias", RecordData::cname("www")), false)
            .unwrap()
            .unwrap();

        assert_eq!(wire.name().to_utf8(), "alias.zone.test.");
        match wire.data() {
            RData::CNAME(cname) => assert_eq!(cname.0.to_utf8(), "www.zone.test."),
            other => panic!("unexpected rdata: {:?}", other),
        }
    }

    #[test]
    fn test_soa_round_trip() {
        let converter = RecordConverter::new("zone.test");
        let values: Vec<FieldValue> = vec![
            300i64.into(),
            1_209_600i64.into(),
            900i64.into(),
            3600i64.into(),
            2_024_010_101i64.into(),
            "hostmaster".into(),
            "ns1".into(),
        ];
        let record = Record::from_values(RecordType::SOA, "@", Some(3600), &values).unwrap();

        assert_eq!(round_trip(&converter, &record), record);
    }

    #[test]
    fn test_soa_email_with_at_sign() {
        let converter = RecordConverter::new("zone.test");
        let record = Record::new(
            "@",
            RecordData::SOA(SoaData {
                minimum_ttl: 300,
                expire_interval: 600,
                retry_interval: 60,
                refresh_interval: 120,
                serial_number: 1,
                email_address: Some("hostmaster@zone.test".into()),
                master_name_server: Some("ns1.zone.test.".into()),
            }),
        );
        let wire = converter.to_wire(&record, false).unwrap().unwrap();
        match wire.data() {
            RData::SOA(soa) => assert_eq!(soa.rname().to_utf8(), "hostmaster.zone.test."),
            other => panic!("unexpected rdata: {:?}", other),
        }
    }

    #[test]
    fn test_ptr_name_is_ip_address_in_reverse_zone() {
        let converter = RecordConverter::new("1.in-addr.arpa");
        let record = Record::new("1.2.3.4", RecordData::ptr("host.zone.test."));

        let wire = converter.to_wire(&record, false).unwrap().unwrap();
        assert_eq!(wire.name().to_utf8(), "4.3.2.1.in-addr.arpa.");

        let back = converter.to_domain(&wire, false).unwrap().unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_ptr_with_partial_owner_keeps_relative_name() {
        let converter = RecordConverter::new("1.in-addr.arpa");
        let record = Record::new("3.2", RecordData::ptr("gw.zone.test."));

        let back = round_trip(&converter, &record);
        assert_eq!(back.name, "3.2");
    }

    #[test]
    fn test_conversion_error_identifies_record() {
        let converter = RecordConverter::new("zone.test");
        let bad = Record::new("www", RecordData::a("not-an-ip"));

        let err = converter.to_wire(&bad, false).unwrap_err();
        match err {
            DomainError::Conversion { name, record_type, .. } => {
                assert_eq!(name, "www");
                assert_eq!(record_type, "A");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(converter.to_wire(&bad, true).unwrap(), None);
    }

    #[test]
    fn test_list_conversion_skips_or_aborts() {
        let converter = RecordConverter::new("zone.test");
        let records = vec![
            Record::new("www", RecordData::a("10.0.0.1")),
            Record::new("bad", RecordData::mx("mail", 70_000)),
            Record::new("ftp", RecordData::a("10.0.0.2")),
        ];

        let partial = converter.to_wire_list(&records, true).unwrap();
        assert_eq!(partial.len(), 2);

        let err = converter.to_wire_list(&records, false).unwrap_err();
        assert!(matches!(err, DomainError::Conversion { ref name, .. } if name == "bad"));
    }

    #[test]
    fn test_unsupported_wire_type_is_conversion_error() {
        let converter = RecordConverter::new("zone.test");
        let wire = WireRecord::from_rdata(
            Name::from_str("zone.test.").unwrap(),
            300,
            RData::HINFO(HINFO::new("x86".to_string(), "linux".to_string())),
        );

        assert!(converter.to_domain(&wire, false).is_err());
        assert_eq!(converter.to_domain(&wire, true).unwrap(), None);
    }
}
