//! DNS execution engine: lookups, zone transfers and dynamic updates against
//! the ordered resolvers of a zone's view.

use async_trait::async_trait;
use hickory_proto::op::Message;
use hickory_proto::rr::{DNSClass, Record as WireRecord};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use zone_manager_application::ports::{
    ConfigurationRepository, ZoneExecutor, ZoneExecutorFactory,
};
use zone_manager_domain::{DomainError, Operation, Record, RecordType, Resolver, View, Zone};

use super::converter::RecordConverter;
use super::message_builder::MessageBuilder;
use super::record_type_map::RecordTypeMapper;
use super::response_parser::{DnsResponse, ResponseParser};
use super::transport::{DnsTransport, Endpoint, TcpTransport, Transport, UdpTransport};
use super::tsig::{sign_optional, TsigSigner};
use super::xfr::{XfrInterpreter, XfrKind, XfrOutcome};

/// The operations a TSIG key can be dedicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    Query,
    Transfer,
    Update,
}

/// Zone-level signers, one per purpose.
#[derive(Debug, Default, Clone)]
pub struct ZoneSigners {
    pub query: Option<Arc<TsigSigner>>,
    pub transfer: Option<Arc<TsigSigner>>,
    pub update: Option<Arc<TsigSigner>>,
}

impl ZoneSigners {
    fn get(&self, purpose: KeyPurpose) -> Option<&Arc<TsigSigner>> {
        match purpose {
            KeyPurpose::Query => self.query.as_ref(),
            KeyPurpose::Transfer => self.transfer.as_ref(),
            KeyPurpose::Update => self.update.as_ref(),
        }
    }
}

/// A resolver together with its own key, used when the zone has none for
/// an operation.
#[derive(Debug, Clone)]
pub struct ResolverTarget {
    pub resolver: Resolver,
    pub signer: Option<Arc<TsigSigner>>,
}

pub struct DnsExecutor {
    zone_name: String,
    targets: Vec<ResolverTarget>,
    signers: ZoneSigners,
    converter: RecordConverter,
    timeout: Duration,
}

impl DnsExecutor {
    pub fn new(
        zone_name: &str,
        targets: Vec<ResolverTarget>,
        signers: ZoneSigners,
        timeout: Duration,
    ) -> Self {
        let converter = RecordConverter::new(zone_name);
        Self {
            zone_name: converter.names().absolute_zone_name().to_string(),
            targets,
            signers,
            converter,
            timeout,
        }
    }

    fn signer_for<'a>(
        &'a self,
        purpose: KeyPurpose,
        target: &'a ResolverTarget,
    ) -> Option<&'a TsigSigner> {
        self.signers
            .get(purpose)
            .or(target.signer.as_ref())
            .map(Arc::as_ref)
    }

    /// Translates a record's operation into RFC 2136 update section records.
    fn update_directives(&self, record: &Record) -> Result<Vec<WireRecord>, DomainError> {
        if record.operation == Operation::None {
            debug!(record = %record, "Record carries no operation, skipping");
            return Ok(Vec::new());
        }

        let mut wire = self.converter.convert_to_wire(record)?;
        Ok(match record.operation {
            Operation::Add => vec![wire],
            Operation::Delete => {
                wire.set_dns_class(DNSClass::NONE);
                wire.set_ttl(0);
                vec![wire]
            }
            Operation::Replace => {
                let mut rrset = WireRecord::update0(wire.name().clone(), 0, wire.record_type());
                rrset.set_dns_class(DNSClass::ANY);
                vec![rrset, wire]
            }
            Operation::None => Vec::new(),
        })
    }

    fn check_id(request: &Message, response: &DnsResponse) -> Result<(), DomainError> {
        if request.id() != response.id {
            return Err(DomainError::MalformedMessage(format!(
                "Response id {} does not match request id {}",
                response.id,
                request.id()
            )));
        }
        Ok(())
    }

    async fn query(
        &self,
        target: &ResolverTarget,
        name: &str,
        record_type: RecordType,
    ) -> Result<DnsResponse, DomainError> {
        let endpoint = Endpoint::resolve(&target.resolver).await?;
        let mut request = MessageBuilder::build_query(name, record_type)?;
        sign_optional(self.signer_for(KeyPurpose::Query, target), &mut request)?;
        let bytes = MessageBuilder::serialize(&request)?;

        let udp = Transport::Udp(UdpTransport::new(endpoint));
        let mut reply = udp.send(&bytes, self.timeout).await?;
        let mut response = ResponseParser::parse(&reply.bytes)?;
        Self::check_id(&request, &response)?;

        if response.truncated {
            debug!(resolver = %target.resolver, "Truncated UDP response, retrying over TCP");
            let tcp = Transport::Tcp(TcpTransport::new(endpoint));
            reply = tcp.send(&bytes, self.timeout).await?;
            response = ResponseParser::parse(&reply.bytes)?;
            Self::check_id(&request, &response)?;
        }

        debug!(
            resolver = %target.resolver,
            protocol = reply.protocol_used,
            answers = response.answers.len(),
            "Query answered"
        );
        Ok(response)
    }

    async fn transfer(
        &self,
        target: &ResolverTarget,
        kind: XfrKind,
        serial: u32,
    ) -> Result<XfrOutcome, DomainError> {
        let endpoint = Endpoint::resolve(&target.resolver).await?;
        let mut request = match kind {
            XfrKind::Axfr => MessageBuilder::build_axfr(&self.zone_name)?,
            XfrKind::Ixfr => MessageBuilder::build_ixfr(&self.zone_name, serial)?,
        };
        sign_optional(self.signer_for(KeyPurpose::Transfer, target), &mut request)?;
        let bytes = MessageBuilder::serialize(&request)?;

        let mut connection = TcpTransport::new(endpoint).connect(self.timeout).await?;
        connection.send(&bytes).await?;

        let mut interpreter = match kind {
            XfrKind::Axfr => XfrInterpreter::new(kind),
            XfrKind::Ixfr => XfrInterpreter::ixfr(serial),
        };
        let mut messages = 0usize;
        while !interpreter.is_finished() {
            let response = ResponseParser::parse(&connection.recv().await?)?;
            Self::check_id(&request, &response)?;
            interpreter.process_message(&response.message)?;
            messages += 1;
        }

        debug!(
            zone = %self.zone_name,
            resolver = %target.resolver,
            kind = ?kind,
            messages = messages,
            "Zone transfer received"
        );
        interpreter.into_outcome()
    }

    fn apply_outcome(
        &self,
        records: &mut Vec<Record>,
        last_serial: u32,
        outcome: XfrOutcome,
    ) -> Result<u32, DomainError> {
        match outcome {
            XfrOutcome::UpToDate { serial } => {
                debug!(zone = %self.zone_name, serial = serial, "Zone already up to date");
                Ok(last_serial)
            }
            XfrOutcome::Full { serial, records: wire } => {
                *records = self.converter.to_domain_list(&wire, true)?;
                info!(zone = %self.zone_name, serial = serial, "IXFR answered with full zone");
                Ok(serial)
            }
            XfrOutcome::Incremental { serial, deltas } => {
                let mut running = last_serial;
                for delta in deltas {
                    let deleted = self.converter.to_domain_list(&delta.deleted, true)?;
                    let added = self.converter.to_domain_list(&delta.added, true)?;
                    records.retain(|r| !deleted.contains(r));
                    for record in added {
                        if !records.contains(&record) {
                            records.push(record);
                        }
                    }
                    debug!(
                        zone = %self.zone_name,
                        from = delta.from_serial,
                        to = delta.to_serial,
                        deleted = delta.deleted.len(),
                        added = delta.added.len(),
                        "Applied zone delta"
                    );
                    running = delta.to_serial;
                }
                if running != serial {
                    warn!(
                        zone = %self.zone_name,
                        applied = running,
                        announced = serial,
                        "IXFR deltas do not reach the announced serial"
                    );
                }
                Ok(serial)
            }
        }
    }
}

#[async_trait]
impl ZoneExecutor for DnsExecutor {
    #[instrument(skip(self), fields(zone = %self.zone_name))]
    async fn find_records(&self) -> Result<Vec<Record>, DomainError> {
        for target in &self.targets {
            match self.transfer(target, XfrKind::Axfr, 0).await {
                Ok(XfrOutcome::Full { serial, records }) => {
                    let converted = self.converter.to_domain_list(&records, true)?;
                    debug!(
                        resolver = %target.resolver,
                        serial = serial,
                        records = converted.len(),
                        "AXFR complete"
                    );
                    return Ok(converted);
                }
                Ok(other) => {
                    warn!(resolver = %target.resolver, outcome = ?other, "Unexpected AXFR outcome");
                }
                Err(e) => {
                    warn!(resolver = %target.resolver, error = %e, "AXFR failed, trying next resolver");
                }
            }
        }

        warn!("AXFR failed on every resolver");
        Ok(Vec::new())
    }

    #[instrument(skip(self), fields(zone = %self.zone_name))]
    async fn lookup(
        &self,
        record_type: Option<RecordType>,
        name: &str,
    ) -> Result<Vec<Record>, DomainError> {
        let record_type = record_type.unwrap_or(RecordType::ANY);
        let fqdn = self.converter.names().absolutize(name);
        let mut last_error = None;

        for target in &self.targets {
            match self.query(target, &fqdn, record_type).await {
                Ok(response) if response.is_success() || response.is_nxdomain() => {
                    let answers: Vec<WireRecord> = response
                        .answers
                        .into_iter()
                        .filter(|r| {
                            record_type == RecordType::ANY
                                || RecordTypeMapper::from_hickory(r.record_type())
                                    == Some(record_type)
                        })
                        .collect();
                    return self.converter.to_domain_list(&answers, true);
                }
                Ok(response) => {
                    warn!(resolver = %target.resolver, rcode = response.status(), "Lookup refused");
                    last_error = Some(DomainError::Transport(format!(
                        "{} answered {}",
                        target.resolver,
                        response.status()
                    )));
                }
                Err(e) if e.is_transport_error() => {
                    warn!(resolver = %target.resolver, error = %e, "Lookup failed, trying next resolver");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| DomainError::Transport("No resolver configured".to_string())))
    }

    #[instrument(skip(self, records), fields(zone = %self.zone_name, count = records.len()))]
    async fn process_record_operations(&self, records: &[Record]) -> Result<bool, DomainError> {
        let mut updates = Vec::with_capacity(records.len());
        for record in records {
            updates.extend(self.update_directives(record)?);
        }
        if updates.is_empty() {
            debug!("No record operations to send");
            return Ok(true);
        }

        let mut last_error = None;
        for target in &self.targets {
            let connection = match Endpoint::resolve(&target.resolver).await {
                Ok(endpoint) => TcpTransport::new(endpoint).connect(self.timeout).await,
                Err(e) => Err(e),
            };
            let mut connection = match connection {
                Ok(c) => c,
                Err(e) => {
                    warn!(resolver = %target.resolver, error = %e, "Resolver unreachable for update");
                    last_error = Some(e);
                    continue;
                }
            };

            let mut request = MessageBuilder::build_update(&self.zone_name, updates.clone())?;
            sign_optional(self.signer_for(KeyPurpose::Update, target), &mut request)?;
            connection.send(&MessageBuilder::serialize(&request)?).await?;
            let response = ResponseParser::parse(&connection.recv().await?)?;
            Self::check_id(&request, &response)?;

            if response.is_success() {
                info!(resolver = %target.resolver, updates = updates.len(), "Dynamic update accepted");
            } else {
                warn!(resolver = %target.resolver, rcode = response.status(), "Dynamic update rejected");
            }
            return Ok(response.is_success());
        }

        Err(last_error.unwrap_or_else(|| DomainError::Transport("No resolver configured".to_string())))
    }

    #[instrument(skip(self, records), fields(zone = %self.zone_name))]
    async fn update_records(
        &self,
        records: &mut Vec<Record>,
        last_serial: u32,
    ) -> Result<u32, DomainError> {
        for target in &self.targets {
            match self.transfer(target, XfrKind::Ixfr, last_serial).await {
                Ok(outcome) => return self.apply_outcome(records, last_serial, outcome),
                Err(e) => {
                    warn!(resolver = %target.resolver, error = %e, "IXFR failed, trying next resolver");
                }
            }
        }

        Err(DomainError::TransferFailed(format!(
            "IXFR of {} failed on every resolver",
            self.zone_name
        )))
    }
}

/// Builds [`DnsExecutor`]s, resolving key names through the configuration.
pub struct HickoryExecutorFactory {
    config_repo: Arc<dyn ConfigurationRepository>,
    timeout: Duration,
}

impl HickoryExecutorFactory {
    pub fn new(config_repo: Arc<dyn ConfigurationRepository>, timeout: Duration) -> Self {
        Self {
            config_repo,
            timeout,
        }
    }

    async fn signer(&self, key_name: Option<&str>) -> Result<Option<Arc<TsigSigner>>, DomainError> {
        let Some(name) = key_name else {
            return Ok(None);
        };
        let key = self
            .config_repo
            .find_tsig_key(name)
            .await?
            .ok_or_else(|| DomainError::TsigKeyNotFound(name.to_string()))?;
        Ok(Some(Arc::new(TsigSigner::from_key(&key)?)))
    }
}

#[async_trait]
impl ZoneExecutorFactory for HickoryExecutorFactory {
    async fn create(&self, view: &View, zone: &Zone) -> Result<Arc<dyn ZoneExecutor>, DomainError> {
        let signers = ZoneSigners {
            query: self.signer(zone.query_key.as_deref()).await?,
            transfer: self.signer(zone.transfer_key.as_deref()).await?,
            update: self.signer(zone.update_key.as_deref()).await?,
        };

        let mut targets = Vec::with_capacity(view.resolvers.len());
        for resolver in &view.resolvers {
            targets.push(ResolverTarget {
                resolver: resolver.clone(),
                signer: self.signer(resolver.tsig_key.as_deref()).await?,
            });
        }

        Ok(Arc::new(DnsExecutor::new(&zone.name, targets, signers, self.timeout)))
    }
}
