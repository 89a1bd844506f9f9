pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use zone_manager_domain::{DomainError, Resolver};

pub use tcp::{TcpConnection, TcpTransport};
pub use udp::UdpTransport;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Vec<u8>,
    /// Which protocol was used
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError>;
}

/// Where to send and, optionally, which local address to send from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    pub server: SocketAddr,
    pub local: Option<IpAddr>,
}

impl Endpoint {
    pub fn new(server: SocketAddr) -> Self {
        Self {
            server,
            local: None,
        }
    }

    /// Local socket address to bind: the configured address, or the
    /// unspecified address of the server's family, on an ephemeral port.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = self.local.unwrap_or(match self.server {
            SocketAddr::V4(_) => IpAddr::from([0, 0, 0, 0]),
            SocketAddr::V6(_) => IpAddr::from([0u16; 8]),
        });
        SocketAddr::new(ip, 0)
    }

    /// Resolves a configured resolver. Host names are looked up through the
    /// system resolver and the first address wins.
    pub async fn resolve(resolver: &Resolver) -> Result<Self, DomainError> {
        let server = match resolver.address.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, resolver.port),
            Err(_) => tokio::net::lookup_host((resolver.address.as_str(), resolver.port))
                .await
                .map_err(|e| {
                    DomainError::Transport(format!("Cannot resolve {}: {}", resolver.address, e))
                })?
                .next()
                .ok_or_else(|| {
                    DomainError::Transport(format!("No address for {}", resolver.address))
                })?,
        };

        let local = match &resolver.local_address {
            Some(addr) => Some(addr.parse::<IpAddr>().map_err(|_| {
                DomainError::InvalidIpAddress(format!("Invalid local address {}", addr))
            })?),
            None => None,
        };

        Ok(Self { server, local })
    }
}

/// Enum-dispatched transport.
pub enum Transport {
    Udp(UdpTransport),
    Tcp(TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }
}
