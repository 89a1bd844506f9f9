use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid record data: {0}")]
    InvalidRecordData(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("Zone not found: {zone} in view {view}")]
    ZoneNotFound { view: String, zone: String },

    #[error("TSIG key not found: {0}")]
    TsigKeyNotFound(String),

    #[error("Cannot convert {record_type} record '{name}': {reason}")]
    Conversion {
        name: String,
        record_type: String,
        reason: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("Zone transfer failed: {0}")]
    TransferFailed(String),

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("TSIG error: {0}")]
    Tsig(String),

    #[error("Service error: {0}")]
    Service(String),
}

impl DomainError {
    /// True for the errors a caller should report as a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::ViewNotFound(_)
                | DomainError::ZoneNotFound { .. }
                | DomainError::TsigKeyNotFound(_)
        )
    }

    pub fn zone_not_found(view: &str, zone: &str) -> Self {
        DomainError::ZoneNotFound {
            view: view.to_string(),
            zone: zone.to_string(),
        }
    }

    /// True for network-level failures that justify trying the next resolver.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::Transport(_) | DomainError::QueryTimeout | DomainError::TransferFailed(_)
        )
    }
}
