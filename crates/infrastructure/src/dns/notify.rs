//! UDP listener for DNS NOTIFY messages (RFC 1996).

use async_trait::async_trait;
use socket2::{Domain, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};
use zone_manager_domain::config::NotifyConfig;
use zone_manager_domain::DomainError;

use super::message_builder::MessageBuilder;
use super::response_parser::ResponseParser;

const MAX_DATAGRAM: usize = 65535;

/// Receives the zone names announced by valid NOTIFY messages.
#[async_trait]
pub trait NotifySink: Send + Sync {
    async fn on_notify(&self, zone_name: &str);
}

pub struct NotifyListener {
    socket: Arc<UdpSocket>,
    local_addr: SocketAddr,
    sink: Arc<dyn NotifySink>,
    permits: Arc<Semaphore>,
    send_timeout: Duration,
}

impl NotifyListener {
    pub fn bind(config: &NotifyConfig, sink: Arc<dyn NotifySink>) -> Result<Self, DomainError> {
        let ip: IpAddr = config.bind_address.parse().map_err(|_| {
            DomainError::InvalidIpAddress(format!(
                "Invalid NOTIFY bind address {}",
                config.bind_address
            ))
        })?;
        let addr = SocketAddr::new(ip, config.port);
        let bind_error = |e: std::io::Error| {
            DomainError::Transport(format!("Failed to bind NOTIFY listener on {}: {}", addr, e))
        };

        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };
        let socket = Socket::new(domain, Type::DGRAM, None).map_err(bind_error)?;
        socket.set_reuse_address(true).map_err(bind_error)?;
        socket.set_nonblocking(true).map_err(bind_error)?;
        socket.bind(&addr.into()).map_err(bind_error)?;

        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket).map_err(bind_error)?;
        let local_addr = socket.local_addr().map_err(bind_error)?;

        Ok(Self {
            socket: Arc::new(socket),
            local_addr,
            sink,
            permits: Arc::new(Semaphore::new(config.threads.max(1))),
            send_timeout: Duration::from_millis(config.socket_timeout_ms),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Runs the receive loop on its own task until the handle is stopped.
    pub fn spawn(self) -> NotifyHandle {
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();
        let local_addr = self.local_addr;

        let join = tokio::spawn(self.run(shutdown.clone(), tracker.clone()));
        info!(addr = %local_addr, "NOTIFY listener started");

        NotifyHandle {
            local_addr,
            shutdown,
            tracker,
            join,
        }
    }

    async fn run(self, shutdown: CancellationToken, tracker: TaskTracker) {
        let mut buf = vec![0u8; MAX_DATAGRAM];

        loop {
            let (len, src) = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(received) => received,
                    Err(e) => {
                        error!(error = %e, "Error receiving NOTIFY datagram");
                        continue;
                    }
                },
            };

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                permit = self.permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            let data = buf[..len].to_vec();
            let socket = self.socket.clone();
            let sink = self.sink.clone();
            let send_timeout = self.send_timeout;
            tracker.spawn(async move {
                handle_datagram(socket, sink, data, src, send_timeout).await;
                drop(permit);
            });
        }

        debug!(addr = %self.local_addr, "NOTIFY receive loop stopped");
    }
}

async fn handle_datagram(
    socket: Arc<UdpSocket>,
    sink: Arc<dyn NotifySink>,
    data: Vec<u8>,
    src: SocketAddr,
    send_timeout: Duration,
) {
    let request = match ResponseParser::parse_notify(&data) {
        Ok(request) => request,
        Err(e) => {
            warn!(client = %src, error = %e, "Dropping invalid NOTIFY datagram");
            return;
        }
    };

    let Some(zone) = request.queries().first().map(|q| q.name().to_string()) else {
        return;
    };

    match MessageBuilder::serialize(&MessageBuilder::build_notify_response(&request)) {
        Ok(bytes) => match tokio::time::timeout(send_timeout, socket.send_to(&bytes, src)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!(client = %src, error = %e, "Failed to answer NOTIFY"),
            Err(_) => warn!(client = %src, "Timed out answering NOTIFY"),
        },
        Err(e) => warn!(client = %src, error = %e, "Failed to encode NOTIFY response"),
    }

    debug!(client = %src, zone = %zone, "NOTIFY received");
    sink.on_notify(&zone).await;
}

/// A running listener.
pub struct NotifyHandle {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    join: JoinHandle<()>,
}

impl NotifyHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Closes the socket and waits for in-flight handlers.
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.join.await {
            error!(error = %e, "NOTIFY receive loop panicked");
        }
        self.tracker.close();
        self.tracker.wait().await;
        info!(addr = %self.local_addr, "NOTIFY listener stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{Message, MessageType, OpCode, Query};
    use hickory_proto::rr::{Name, RecordType};
    use std::str::FromStr;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        zones: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotifySink for RecordingSink {
        async fn on_notify(&self, zone_name: &str) {
            self.zones.lock().unwrap().push(zone_name.to_string());
        }
    }

    fn local_config() -> NotifyConfig {
        NotifyConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            socket_timeout_ms: 500,
            threads: 2,
        }
    }

    fn notify_bytes(id: u16, op_code: OpCode) -> Vec<u8> {
        let mut message = Message::new(id, MessageType::Query, op_code);
        message.add_query(Query::query(
            Name::from_str("zone.test.").unwrap(),
            RecordType::SOA,
        ));
        MessageBuilder::serialize(&message).unwrap()
    }

    #[tokio::test]
    async fn test_notify_is_acknowledged_and_forwarded() {
        let sink = Arc::new(RecordingSink::default());
        let listener = NotifyListener::bind(&local_config(), sink.clone()).unwrap();
        let handle = listener.spawn();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(&notify_bytes(4242, OpCode::Notify), handle.local_addr())
            .await
            .unwrap();

        let mut buf = vec![0u8; 512];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        let response = Message::from_vec(&buf[..len]).unwrap();
        assert_eq!(response.id(), 4242);
        assert_eq!(response.message_type(), MessageType::Response);
        assert_eq!(response.op_code(), OpCode::Notify);
        assert!(response.answers().is_empty());

        handle.stop().await;
        assert_eq!(*sink.zones.lock().unwrap(), vec!["zone.test.".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_datagram_gets_no_answer() {
        let sink = Arc::new(RecordingSink::default());
        let handle = NotifyListener::bind(&local_config(), sink.clone())
            .unwrap()
            .spawn();

        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        client
            .send_to(&notify_bytes(7, OpCode::Query), handle.local_addr())
            .await
            .unwrap();
        client.send_to(b"garbage", handle.local_addr()).await.unwrap();

        let mut buf = vec![0u8; 512];
        let answered =
            tokio::time::timeout(Duration::from_millis(300), client.recv_from(&mut buf)).await;
        assert!(answered.is_err());

        handle.stop().await;
        assert!(sink.zones.lock().unwrap().is_empty());
    }

    #[test]
    fn test_bind_rejects_bad_address() {
        let mut config = local_config();
        config.bind_address = "not-an-ip".to_string();
        let sink = Arc::new(RecordingSink::default());
        assert!(matches!(
            NotifyListener::bind(&config, sink),
            Err(DomainError::InvalidIpAddress(_))
        ));
    }
}
