pub mod converter;
pub mod executor;
pub mod message_builder;
pub mod notify;
pub mod record_type_map;
pub mod response_parser;
pub mod transport;
pub mod tsig;
pub mod xfr;

pub use converter::RecordConverter;
pub use executor::{DnsExecutor, HickoryExecutorFactory, ResolverTarget, ZoneSigners};
pub use notify::{NotifyHandle, NotifyListener, NotifySink};
pub use tsig::TsigSigner;
pub use xfr::{XfrInterpreter, XfrKind, XfrOutcome};
