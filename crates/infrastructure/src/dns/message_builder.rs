//! DNS Message Builder
//!
//! Constructs the query, zone transfer, dynamic update and NOTIFY response
//! messages the zone manager exchanges, using `hickory-proto`. Messages are
//! returned unserialized so they can be TSIG-signed before going on the wire.

use super::record_type_map::RecordTypeMapper;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::SOA;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;
use zone_manager_domain::{DomainError, RecordType};

/// Builds DNS messages
pub struct MessageBuilder;

impl MessageBuilder {
    pub fn parse_name(name: &str) -> Result<Name, DomainError> {
        Name::from_str(name).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", name, e))
        })
    }

    fn question(name: Name, query_type: HickoryRecordType) -> Query {
        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(query_type);
        query.set_query_class(DNSClass::IN);
        query
    }

    /// Build a lookup for `name`. `RecordType::ANY` asks for every type.
    pub fn build_query(name: &str, record_type: RecordType) -> Result<Message, DomainError> {
        let name = Self::parse_name(name)?;
        let hickory_type = RecordTypeMapper::to_hickory(record_type);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(Self::question(name, hickory_type));
        Ok(message)
    }

    /// Build a full zone transfer request.
    pub fn build_axfr(zone: &str) -> Result<Message, DomainError> {
        let zone = Self::parse_name(zone)?;
        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.add_query(Self::question(zone, HickoryRecordType::AXFR));
        Ok(message)
    }

    /// Build an incremental zone transfer request from `serial`.
    ///
    /// The authority section carries the client's SOA (RFC 1995 §3); only
    /// its serial is significant to the server.
    pub fn build_ixfr(zone: &str, serial: u32) -> Result<Message, DomainError> {
        let zone = Self::parse_name(zone)?;
        let soa = SOA::new(zone.clone(), zone.clone(), serial, 0, 0, 0, 0);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.add_query(Self::question(zone.clone(), HickoryRecordType::IXFR));
        message.add_name_server(Record::from_rdata(zone, 0, RData::SOA(soa)));
        Ok(message)
    }

    /// Build an RFC 2136 update for `zone` carrying the prepared update
    /// records in the update section.
    pub fn build_update(zone: &str, updates: Vec<Record>) -> Result<Message, DomainError> {
        let zone = Self::parse_name(zone)?;
        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Update);
        message.add_query(Self::question(zone, HickoryRecordType::SOA));
        for update in updates {
            message.add_name_server(update);
        }
        Ok(message)
    }

    /// The acknowledgement of a NOTIFY: same id and question, response flag
    /// set, no answers.
    pub fn build_notify_response(request: &Message) -> Message {
        let mut response = Message::new(request.id(), MessageType::Response, OpCode::Notify);
        response.set_authoritative(true);
        for query in request.queries() {
            response.add_query(query.clone());
        }
        response
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DomainError::MalformedMessage(format!("Failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
