//! Interpretation of AXFR (RFC 5936) and IXFR (RFC 1995) response streams.
//!
//! Both transfers open with the server's current SOA. An AXFR ends with a
//! second copy of it. An IXFR answer is one of three shapes:
//!
//! * the current SOA alone, when the client is already up to date. This is
//!   recognised by the SOA serial not being newer than the client's, so an
//!   opening SOA sent on its own in a longer stream is not mistaken for it;
//! * a full zone, recognisable by a non-SOA second record;
//! * difference sequences, each an old SOA and its deleted records followed
//!   by a new SOA and its added records, closed by the current SOA again.

use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::{RData, Record};
use zone_manager_domain::DomainError;

use super::response_parser::ResponseParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XfrKind {
    Axfr,
    Ixfr,
}

/// Whether records of an IXFR difference sequence are being deleted or added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IxfrUpdateMode {
    Deleting,
    Adding,
}

impl IxfrUpdateMode {
    fn toggle(&mut self) {
        *self = match self {
            IxfrUpdateMode::Deleting => IxfrUpdateMode::Adding,
            IxfrUpdateMode::Adding => IxfrUpdateMode::Deleting,
        };
    }
}

/// One serial change of an incremental transfer. The SOA records bounding
/// the sequence are included: the old one in `deleted`, the new one in
/// `added`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub from_serial: u32,
    pub to_serial: u32,
    pub deleted: Vec<Record>,
    pub added: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum XfrOutcome {
    UpToDate { serial: u32 },
    /// Zone contents, starting with the SOA. The closing SOA is not included.
    Full { serial: u32, records: Vec<Record> },
    Incremental { serial: u32, deltas: Vec<Delta> },
}

#[derive(Debug)]
pub struct XfrInterpreter {
    /// What the server answered with, which for an IXFR request may turn
    /// out to be a full transfer.
    actual: XfrKind,
    /// Serial the client asked an IXFR from.
    client_serial: Option<u32>,
    initial_serial: Option<u32>,
    /// Opening SOA of an IXFR answer, kept in case it turns out to be a
    /// full zone.
    initial_soa: Option<Record>,
    rr_count: usize,
    mode: IxfrUpdateMode,
    records: Vec<Record>,
    deltas: Vec<Delta>,
    up_to_date: bool,
    finished: bool,
}

/// RFC 1982 serial number comparison.
fn serial_is_newer(serial: u32, than: u32) -> bool {
    serial != than && (serial.wrapping_sub(than) as i32) > 0
}

fn soa_serial(record: &Record) -> Option<u32> {
    match record.data() {
        RData::SOA(soa) => Some(soa.serial()),
        _ => None,
    }
}

impl XfrInterpreter {
    pub fn new(kind: XfrKind) -> Self {
        Self {
            actual: kind,
            client_serial: None,
            initial_serial: None,
            initial_soa: None,
            rr_count: 0,
            // The first difference sequence is a deletion; starting in
            // Adding makes the first toggle land on Deleting.
            mode: IxfrUpdateMode::Adding,
            records: Vec::new(),
            deltas: Vec::new(),
            up_to_date: false,
            finished: false,
        }
    }

    /// Interpreter for an IXFR requested from `client_serial`.
    pub fn ixfr(client_serial: u32) -> Self {
        Self {
            client_serial: Some(client_serial),
            ..Self::new(XfrKind::Ixfr)
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feeds the answer section of the next response message.
    pub fn process_message(&mut self, message: &Message) -> Result<(), DomainError> {
        if self.finished {
            return Err(DomainError::TransferFailed(
                "Response received after the transfer completed".to_string(),
            ));
        }
        if message.message_type() != MessageType::Response {
            return Err(DomainError::TransferFailed("Not a response".to_string()));
        }
        if message.response_code() != ResponseCode::NoError {
            return Err(DomainError::TransferFailed(format!(
                "Server answered {}",
                ResponseParser::rcode_to_status(message.response_code())
            )));
        }

        if self.rr_count == 0 && message.answers().is_empty() {
            return Err(DomainError::TransferFailed("Empty transfer".to_string()));
        }

        for record in message.answers() {
            if self.finished {
                break;
            }
            self.process_record(record.clone())?;
        }

        Ok(())
    }

    pub fn process_record(&mut self, record: Record) -> Result<(), DomainError> {
        self.rr_count += 1;
        let serial = soa_serial(&record);

        let Some(initial_serial) = self.initial_serial else {
            let Some(serial) = serial else {
                return Err(DomainError::TransferFailed(
                    "Transfer does not start with an SOA record".to_string(),
                ));
            };
            self.initial_serial = Some(serial);
            match self.actual {
                XfrKind::Axfr => self.records.push(record),
                XfrKind::Ixfr => {
                    if let Some(client) = self.client_serial {
                        if !serial_is_newer(serial, client) {
                            self.up_to_date = true;
                            self.finished = true;
                        }
                    }
                    self.initial_soa = Some(record);
                }
            }
            return Ok(());
        };

        match self.actual {
            XfrKind::Axfr => {
                if serial == Some(initial_serial) {
                    self.finished = true;
                } else {
                    self.records.push(record);
                }
            }
            XfrKind::Ixfr if self.rr_count == 2 && serial.is_none() => {
                // Incremental transfer unavailable: the rest is a full zone.
                self.actual = XfrKind::Axfr;
                if let Some(initial) = self.initial_soa.take() {
                    self.records.push(initial);
                }
                self.records.push(record);
            }
            XfrKind::Ixfr => match serial {
                Some(serial) => {
                    self.mode.toggle();
                    match self.mode {
                        IxfrUpdateMode::Deleting => {
                            if serial == initial_serial {
                                self.finished = true;
                            } else {
                                self.deltas.push(Delta {
                                    from_serial: serial,
                                    deleted: vec![record],
                                    ..Delta::default()
                                });
                            }
                        }
                        IxfrUpdateMode::Adding => {
                            let delta = self.current_delta()?;
                            delta.to_serial = serial;
                            delta.added.push(record);
                        }
                    }
                }
                None => {
                    let mode = self.mode;
                    let delta = self.current_delta()?;
                    match mode {
                        IxfrUpdateMode::Deleting => delta.deleted.push(record),
                        IxfrUpdateMode::Adding => delta.added.push(record),
                    }
                }
            },
        }

        Ok(())
    }

    fn current_delta(&mut self) -> Result<&mut Delta, DomainError> {
        self.deltas
            .last_mut()
            .ok_or_else(|| DomainError::TransferFailed("Malformed IXFR sequence".to_string()))
    }

    pub fn into_outcome(self) -> Result<XfrOutcome, DomainError> {
        let serial = match self.initial_serial {
            Some(serial) if self.finished => serial,
            _ => {
                return Err(DomainError::TransferFailed(
                    "Transfer ended prematurely".to_string(),
                ))
            }
        };

        if self.up_to_date {
            return Ok(XfrOutcome::UpToDate { serial });
        }
        Ok(match self.actual {
            XfrKind::Axfr => XfrOutcome::Full {
                serial,
                records: self.records,
            },
            XfrKind::Ixfr => XfrOutcome::Incremental {
                serial,
                deltas: self.deltas,
            },
        })
    }
}
