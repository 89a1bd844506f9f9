#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod mock_dns_server;

pub use builders::{a, dead_resolver, resolver_for, soa, targets, txt};
pub use mock_dns_server::{MockDnsServer, ServerScript};
