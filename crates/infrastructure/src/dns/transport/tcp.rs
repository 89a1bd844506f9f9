//! DNS over TCP with the two-byte length prefix of RFC 1035 §4.2.2.

use super::{DnsTransport, Endpoint, TransportResponse};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpSocket, TcpStream};
use tracing::debug;
use zone_manager_domain::DomainError;

pub struct TcpTransport {
    endpoint: Endpoint,
}

impl TcpTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    /// Opens a connection for exchanges that span several messages, such as
    /// zone transfers.
    pub async fn connect(&self, timeout: Duration) -> Result<TcpConnection, DomainError> {
        let server = self.endpoint.server;
        let socket = if server.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(|e| DomainError::Transport(format!("Failed to create TCP socket: {}", e)))?;

        if self.endpoint.local.is_some() {
            socket.bind(self.endpoint.bind_addr()).map_err(|e| {
                DomainError::Transport(format!(
                    "Failed to bind {}: {}",
                    self.endpoint.bind_addr(),
                    e
                ))
            })?;
        }

        let stream = tokio::time::timeout(timeout, socket.connect(server))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| DomainError::Transport(format!("Failed to connect to {}: {}", server, e)))?;

        debug!(server = %server, "TCP connection established");

        Ok(TcpConnection {
            stream,
            timeout,
            peer: server.to_string(),
        })
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let mut connection = self.connect(timeout).await?;
        connection.send(message_bytes).await?;
        let bytes = connection.recv().await?;
        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }
}

/// An open TCP connection to a name server.
pub struct TcpConnection {
    stream: TcpStream,
    timeout: Duration,
    peer: String,
}

impl TcpConnection {
    pub async fn send(&mut self, message_bytes: &[u8]) -> Result<(), DomainError> {
        let len = u16::try_from(message_bytes.len()).map_err(|_| {
            DomainError::MalformedMessage(format!(
                "Message of {} bytes exceeds TCP frame size",
                message_bytes.len()
            ))
        })?;

        let mut frame = Vec::with_capacity(message_bytes.len() + 2);
        frame.extend_from_slice(&len.to_be_bytes());
        frame.extend_from_slice(message_bytes);

        tokio::time::timeout(self.timeout, self.stream.write_all(&frame))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| DomainError::Transport(format!("Failed to write to {}: {}", self.peer, e)))
    }

    /// Reads the next framed message.
    pub async fn recv(&mut self) -> Result<Vec<u8>, DomainError> {
        let timeout = self.timeout;
        let peer = self.peer.clone();
        let read = async {
            let len = self.stream.read_u16().await? as usize;
            let mut buf = vec![0u8; len];
            self.stream.read_exact(&mut buf).await?;
            Ok::<_, std::io::Error>(buf)
        };

        tokio::time::timeout(timeout, read)
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| DomainError::Transport(format!("Failed to read from {}: {}", peer, e)))
    }
}
