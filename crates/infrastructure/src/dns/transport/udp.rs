use super::{DnsTransport, Endpoint, TransportResponse};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::{debug, warn};
use zone_manager_domain::DomainError;

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP, one socket per exchange.
pub struct UdpTransport {
    endpoint: Endpoint,
}

impl UdpTransport {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, DomainError> {
        let server = self.endpoint.server;
        let socket = UdpSocket::bind(self.endpoint.bind_addr())
            .await
            .map_err(|e| DomainError::Transport(format!("Failed to bind UDP socket: {}", e)))?;

        let bytes_sent = tokio::time::timeout(timeout, socket.send_to(message_bytes, server))
            .await
            .map_err(|_| DomainError::QueryTimeout)?
            .map_err(|e| {
                DomainError::Transport(format!("Failed to send UDP query to {}: {}", server, e))
            })?;

        debug!(server = %server, bytes_sent = bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        let (bytes_received, from_addr) =
            tokio::time::timeout(timeout, socket.recv_from(&mut recv_buf))
                .await
                .map_err(|_| DomainError::QueryTimeout)?
                .map_err(|e| {
                    DomainError::Transport(format!(
                        "Failed to receive UDP response from {}: {}",
                        server, e
                    ))
                })?;

        if from_addr.ip() != server.ip() {
            warn!(
                expected = %server,
                received_from = %from_addr,
                "UDP response from unexpected source"
            );
        }

        recv_buf.truncate(bytes_received);

        debug!(server = %server, bytes_received = bytes_received, "UDP response received");

        Ok(TransportResponse {
            bytes: recv_buf,
            protocol_used: "UDP",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_udp_exchange_with_echo_server() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; 512];
            let (len, peer) = server.recv_from(&mut buf).await.unwrap();
            server.send_to(&buf[..len], peer).await.unwrap();
        });

        let transport = UdpTransport::new(Endpoint::new(server_addr));
        let response = transport.send(b"ping", Duration::from_secs(2)).await.unwrap();

        assert_eq!(response.bytes, b"ping");
        assert_eq!(response.protocol_used, "UDP");
    }

    #[tokio::test]
    async fn test_udp_timeout() {
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::new(Endpoint::new(silent.local_addr().unwrap()));

        let err = transport
            .send(b"ping", Duration::from_millis(50))
            .await
            .unwrap_err();

        assert_eq!(err, DomainError::QueryTimeout);
    }
}
