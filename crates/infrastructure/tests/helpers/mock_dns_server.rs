use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::{Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// What the mock authoritative server answers.
#[derive(Clone, Default)]
pub struct ServerScript {
    /// AXFR answer, one inner vector per message.
    pub axfr: Vec<Vec<Record>>,
    /// IXFR answer, one inner vector per message.
    pub ixfr: Vec<Vec<Record>>,
    /// Records served to plain queries, filtered by name and type.
    pub records: Vec<Record>,
    /// Answer UDP queries with an empty truncated response.
    pub truncate_udp: bool,
    /// Response code for transfers and queries.
    pub rcode: Option<ResponseCode>,
    /// Response code for dynamic updates.
    pub update_rcode: Option<ResponseCode>,
}

/// In-process authoritative server speaking DNS over UDP and TCP on the
/// same port.
pub struct MockDnsServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Message>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockDnsServer {
    pub async fn start(script: ServerScript) -> Self {
        let (tcp, udp) = Self::bind_pair().await;
        let addr = tcp.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let script = Arc::new(script);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_script = script.clone();
        let udp_received = received.clone();
        let udp = Arc::new(udp);
        let tcp_script = script;
        let tcp_received = received.clone();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = udp.recv_from(&mut buf) => {
                        let Ok((len, peer)) = result else { continue };
                        let Ok(request) = Message::from_vec(&buf[..len]) else { continue };
                        udp_received.lock().unwrap().push(request.clone());
                        let responses = answer(&udp_script, &request, true);
                        for response in responses {
                            let _ = udp.send_to(&encode(&response), peer).await;
                        }
                    }
                    accepted = tcp.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        tokio::spawn(serve_tcp(stream, tcp_script.clone(), tcp_received.clone()));
                    }
                }
            }
        });

        Self {
            addr,
            received,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    async fn bind_pair() -> (TcpListener, UdpSocket) {
        loop {
            let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = tcp.local_addr().unwrap();
            if let Ok(udp) = UdpSocket::bind(addr).await {
                return (tcp, udp);
            }
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Requests received so far, in arrival order.
    pub fn received(&self) -> Vec<Message> {
        self.received.lock().unwrap().clone()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_tcp(
    mut stream: TcpStream,
    script: Arc<ServerScript>,
    received: Arc<Mutex<Vec<Message>>>,
) {
    loop {
        let Ok(len) = stream.read_u16().await else { return };
        let mut buf = vec![0u8; len as usize];
        if stream.read_exact(&mut buf).await.is_err() {
            return;
        }
        let Ok(request) = Message::from_vec(&buf) else { return };
        received.lock().unwrap().push(request.clone());

        for response in answer(&script, &request, false) {
            let bytes = encode(&response);
            let mut frame = (bytes.len() as u16).to_be_bytes().to_vec();
            frame.extend_from_slice(&bytes);
            if stream.write_all(&frame).await.is_err() {
                return;
            }
        }
    }
}

fn response_to(request: &Message, rcode: ResponseCode) -> Message {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    for query in request.queries() {
        response.add_query(query.clone());
    }
    response.set_authoritative(true);
    response.set_response_code(rcode);
    response
}

fn answer(script: &ServerScript, request: &Message, over_udp: bool) -> Vec<Message> {
    if request.op_code() == OpCode::Update {
        return vec![response_to(
            request,
            script.update_rcode.unwrap_or(ResponseCode::NoError),
        )];
    }

    let rcode = script.rcode.unwrap_or(ResponseCode::NoError);
    let Some(query) = request.queries().first() else {
        return vec![response_to(request, ResponseCode::FormErr)];
    };

    let transfer = match query.query_type() {
        RecordType::AXFR => Some(&script.axfr),
        RecordType::IXFR => Some(&script.ixfr),
        _ => None,
    };

    if let Some(messages) = transfer {
        if rcode != ResponseCode::NoError {
            return vec![response_to(request, rcode)];
        }
        return messages
            .iter()
            .map(|answers| {
                let mut response = response_to(request, rcode);
                for record in answers {
                    response.add_answer(record.clone());
                }
                response
            })
            .collect();
    }

    let mut response = response_to(request, rcode);
    if over_udp && script.truncate_udp {
        response.set_truncated(true);
        return vec![response];
    }

    let matching: Vec<&Record> = script
        .records
        .iter()
        .filter(|r| r.name() == query.name())
        .filter(|r| query.query_type() == RecordType::ANY || r.record_type() == query.query_type())
        .collect();
    if matching.is_empty() && rcode == ResponseCode::NoError {
        response.set_response_code(ResponseCode::NXDomain);
    }
    for record in matching {
        response.add_answer(record.clone());
    }
    vec![response]
}

fn encode(message: &Message) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut encoder = BinEncoder::new(&mut buf);
    message.emit(&mut encoder).unwrap();
    buf
}
