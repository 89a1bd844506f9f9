use bytes::Bytes;
use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::Record;
use tracing::debug;
use zone_manager_domain::DomainError;

#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,

    pub rcode: ResponseCode,

    pub truncated: bool,

    pub answers: Vec<Record>,

    pub message: Message,

    /// Raw wire bytes of the response.
    pub raw_bytes: Bytes,
}

impl DnsResponse {
    pub fn is_success(&self) -> bool {
        self.rcode == ResponseCode::NoError
    }

    pub fn is_nxdomain(&self) -> bool {
        self.rcode == ResponseCode::NXDomain
    }

    pub fn status(&self) -> &'static str {
        ResponseParser::rcode_to_status(self.rcode)
    }
}

pub struct ResponseParser;

impl ResponseParser {
    /// Parses a DNS response from owned bytes (zero-copy for raw_bytes).
    pub fn parse_bytes(response_bytes: Bytes) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::MalformedMessage(format!("Failed to parse DNS response: {}", e))
        })?;

        if message.message_type() != MessageType::Response {
            return Err(DomainError::MalformedMessage(
                "Expected a response, got a query".to_string(),
            ));
        }

        let rcode = message.response_code();
        let truncated = message.truncated();
        let answers = message.answers().to_vec();

        debug!(
            rcode = ?rcode,
            answers = answers.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsResponse {
            id: message.id(),
            rcode,
            truncated,
            answers,
            message,
            raw_bytes: response_bytes,
        })
    }

    pub fn parse(response_bytes: &[u8]) -> Result<DnsResponse, DomainError> {
        Self::parse_bytes(Bytes::copy_from_slice(response_bytes))
    }

    /// Parses an incoming datagram that must be a NOTIFY request.
    pub fn parse_notify(request_bytes: &[u8]) -> Result<Message, DomainError> {
        let message = Message::from_vec(request_bytes).map_err(|e| {
            DomainError::MalformedMessage(format!("Failed to parse NOTIFY: {}", e))
        })?;

        if message.op_code() != OpCode::Notify {
            return Err(DomainError::MalformedMessage(format!(
                "Expected NOTIFY, got opcode {:?}",
                message.op_code()
            )));
        }
        if message.message_type() != MessageType::Query {
            return Err(DomainError::MalformedMessage(
                "NOTIFY has the response flag set".to_string(),
            ));
        }
        if message.queries().is_empty() {
            return Err(DomainError::MalformedMessage(
                "NOTIFY without a zone".to_string(),
            ));
        }

        Ok(message)
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            ResponseCode::NotAuth => "NOTAUTH",
            ResponseCode::NotZone => "NOTZONE",
            ResponseCode::YXDomain => "YXDOMAIN",
            ResponseCode::YXRRSet => "YXRRSET",
            ResponseCode::NXRRSet => "NXRRSET",
            _ => "UNKNOWN",
        }
    }
}
