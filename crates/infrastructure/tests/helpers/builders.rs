use hickory_proto::rr::rdata::{A, SOA, TXT};
use hickory_proto::rr::{Name, RData, Record};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use zone_manager_domain::Resolver;
use zone_manager_infrastructure::dns::ResolverTarget;

pub const ZONE: &str = "zone.test.";

fn name(relative: &str) -> Name {
    if relative == "@" {
        Name::from_str(ZONE).unwrap()
    } else {
        Name::from_str(&format!("{}.{}", relative, ZONE)).unwrap()
    }
}

pub fn soa(serial: u32) -> Record {
    Record::from_rdata(
        name("@"),
        3600,
        RData::SOA(SOA::new(
            name("ns1"),
            name("hostmaster"),
            serial,
            3600,
            600,
            604800,
            300,
        )),
    )
}

pub fn a(host: &str, last_octet: u8) -> Record {
    Record::from_rdata(
        name(host),
        300,
        RData::A(A(Ipv4Addr::new(10, 0, 0, last_octet))),
    )
}

pub fn txt(host: &str, value: &str) -> Record {
    Record::from_rdata(name(host), 300, RData::TXT(TXT::new(vec![value.to_string()])))
}

pub fn resolver_for(addr: SocketAddr) -> Resolver {
    Resolver::new(addr.ip().to_string(), addr.port())
}

/// A resolver on a port nothing listens on.
pub async fn dead_resolver() -> Resolver {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    resolver_for(addr)
}

pub fn targets(resolvers: Vec<Resolver>) -> Vec<ResolverTarget> {
    resolvers
        .into_iter()
        .map(|resolver| ResolverTarget {
            resolver,
            signer: None,
        })
        .collect()
}
