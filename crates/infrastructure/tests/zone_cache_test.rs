use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RecordType as WireType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use zone_manager_application::ports::ZoneCachePort;
use zone_manager_domain::{Config, ZoneIdentity};
use zone_manager_infrastructure::cache::{CacheState, ZoneCache, ZoneCacheSettings};
use zone_manager_infrastructure::dns::HickoryExecutorFactory;
use zone_manager_infrastructure::repositories::ConfigRepository;

mod helpers;
use helpers::{a, soa, MockDnsServer, ServerScript};

fn config(server: SocketAddr) -> Config {
    Config::from_toml(&format!(
        r#"
[notify]
bind_address = "127.0.0.1"
port = 0
threads = 2

[[views]]
name = "internal"

[[views.resolvers]]
address = "127.0.0.1"
port = {}

[[views.zones]]
name = "zone.test"
"#,
        server.port()
    ))
    .unwrap()
}

async fn start_cache(server: &MockDnsServer) -> Arc<ZoneCache> {
    let config = config(server.addr());
    let notify = config.notify.clone();
    let repo = Arc::new(ConfigRepository::new(config));
    let factory = Arc::new(HickoryExecutorFactory::new(
        repo.clone(),
        Duration::from_secs(2),
    ));

    let cache = ZoneCache::new(
        repo,
        factory,
        ZoneCacheSettings {
            default_refresh: Duration::from_secs(3600),
            bootstrap_delay: Duration::from_secs(3600),
            notify: Some(notify),
        },
    );
    cache.start().await.unwrap();
    cache
}

async fn send_notify(target: SocketAddr) -> Message {
    let mut message = Message::new(99, MessageType::Query, OpCode::Notify);
    message.add_query(Query::query(Name::from_str("zone.test.").unwrap(), WireType::SOA));
    let mut bytes = Vec::new();
    message.emit(&mut BinEncoder::new(&mut bytes)).unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    client.send_to(&bytes, target).await.unwrap();

    let mut buf = vec![0u8; 512];
    let (len, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    Message::from_vec(&buf[..len]).unwrap()
}

async fn wait_for_serial(cache: &ZoneCache, identity: &ZoneIdentity, serial: u32) -> bool {
    for _ in 0..100 {
        if cache.snapshot(identity).map(|s| s.serial) == Some(serial) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

fn script() -> ServerScript {
    ServerScript {
        axfr: vec![vec![soa(5), a("www", 1), soa(5)]],
        ixfr: vec![vec![soa(6), soa(5), soa(6), a("new", 3), soa(6)]],
        ..Default::default()
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_start_loads_configured_zones() {
    let server = MockDnsServer::start(script()).await;
    let cache = start_cache(&server).await;
    let identity = ZoneIdentity::new("internal", "zone.test");

    assert_eq!(cache.state(), CacheState::Suspended);
    let snapshot = cache.snapshot(&identity).unwrap();
    assert_eq!(snapshot.serial, 5);
    assert_eq!(snapshot.records.len(), 2);
    assert_eq!(snapshot.refresh_interval, Duration::from_secs(3600));
    assert!(cache.notify_addr().await.is_some());

    cache.stop().await;
    assert_eq!(cache.state(), CacheState::Stopped);
    assert!(cache.cached_records(&identity).is_none());
}

// ============================================================================
// NOTIFY
// ============================================================================

#[tokio::test]
async fn test_notify_triggers_incremental_refresh() {
    let server = MockDnsServer::start(script()).await;
    let cache = start_cache(&server).await;
    let identity = ZoneIdentity::new("internal", "zone.test");
    assert!(cache.resume());

    let addr = cache.notify_addr().await.unwrap();
    let ack = send_notify(addr).await;
    assert_eq!(ack.id(), 99);
    assert_eq!(ack.message_type(), MessageType::Response);

    assert!(wait_for_serial(&cache, &identity, 6).await);
    let records = cache.cached_records(&identity).unwrap();
    assert!(records.iter().any(|r| r.name == "new"));
    assert_eq!(cache.pending_count(), 0);

    cache.stop().await;
}

#[tokio::test]
async fn test_notify_while_suspended_only_flags() {
    let server = MockDnsServer::start(script()).await;
    let cache = start_cache(&server).await;
    let identity = ZoneIdentity::new("internal", "zone.test");

    let addr = cache.notify_addr().await.unwrap();
    send_notify(addr).await;

    for _ in 0..100 {
        if cache.is_flagged(&identity) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(cache.is_flagged(&identity));
    assert_eq!(cache.snapshot(&identity).unwrap().serial, 5);

    cache.resume();
    cache.refresh().await;
    assert_eq!(cache.snapshot(&identity).unwrap().serial, 6);
    assert!(!cache.is_flagged(&identity));

    cache.stop().await;
}
