//! HCI command exchanges
//!
//! A [`CommandExchange`] is one outbound HCI command together with the event
//! that completes it. What the command looks like on the wire and which event
//! finishes it is described by a static [`CommandKind`]; the kinds this crate
//! issues are defined at the bottom of this module.

use crate::error::HciError;
use crate::hci::constants::*;
use crate::hci::packet::{ocf, ogf, opcode, EventHeader};
use byteorder::{ByteOrder, LittleEndian};

/// Shape of one HCI command
#[derive(Debug, PartialEq, Eq)]
pub struct CommandKind {
    pub name: &'static str,
    pub opcode: u16,
    /// Event code (or LE sub-event code) that completes the command
    pub response_event: u8,
    /// Whether `response_event` is an LE Meta sub-event code
    pub le_meta: bool,
    /// Size of the outbound parameter block
    pub outbound_size: usize,
    /// Size of the inbound payload kept from the completing event
    pub inbound_size: usize,
}

/// How a command exchange ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// The controller rejected the command with this status
    Status(u8),
    /// The completing event was too short to carry a result
    Malformed,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// One outstanding HCI command
#[derive(Debug)]
pub struct CommandExchange {
    kind: &'static CommandKind,
    buffer: Vec<u8>,
    offset: usize,
    response: Vec<u8>,
    outcome: Option<Outcome>,
}

impl CommandExchange {
    /// Create an exchange with a zeroed parameter block
    pub fn new(kind: &'static CommandKind) -> Self {
        let mut buffer = vec![0u8; HCI_COMMAND_HDR_SIZE + kind.outbound_size];
        buffer[0] = HCI_COMMAND_PKT;
        LittleEndian::write_u16(&mut buffer[1..3], kind.opcode);
        buffer[3] = kind.outbound_size as u8;

        Self {
            kind,
            buffer,
            offset: 0,
            response: vec![0u8; kind.inbound_size],
            outcome: None,
        }
    }

    /// Create an exchange from a typed parameter block
    ///
    /// Fails when the block cannot be put on the wire, e.g. it carries an
    /// invalid address.
    pub fn with_parameters<P: CommandParameters>(parameters: &P) -> Result<Self, HciError> {
        let mut exchange = Self::new(P::KIND);
        let mut payload = Vec::with_capacity(P::KIND.outbound_size);
        parameters.encode(&mut payload)?;
        debug_assert_eq!(payload.len(), P::KIND.outbound_size);
        exchange.fill_payload(&payload);
        Ok(exchange)
    }

    pub fn kind(&self) -> &'static CommandKind {
        self.kind
    }

    pub fn opcode(&self) -> u16 {
        self.kind.opcode
    }

    /// Zero the outbound parameter block
    pub fn clear(&mut self) {
        self.buffer[HCI_COMMAND_HDR_SIZE..].fill(0);
    }

    /// Replace the outbound parameter block
    ///
    /// The block must have exactly the size the command kind declares.
    pub fn set_payload(&mut self, payload: &[u8]) -> Result<(), HciError> {
        if payload.len() != self.kind.outbound_size {
            return Err(HciError::InvalidParamLength(payload.len()));
        }
        self.fill_payload(payload);
        Ok(())
    }

    pub fn payload(&self) -> &[u8] {
        &self.buffer[HCI_COMMAND_HDR_SIZE..]
    }

    /// The complete command packet, packet tag included
    pub fn packet(&self) -> &[u8] {
        &self.buffer
    }

    /// Rewind for another round trip
    ///
    /// The outbound cursor goes back to the start of the packet and the
    /// inbound side returns to pending.
    pub fn reload(&mut self) {
        self.offset = 0;
        self.outcome = None;
        self.response.fill(0);
    }

    /// Copy the next piece of the packet into `stream`
    ///
    /// Returns the number of bytes written, zero once the whole packet went out.
    pub fn serialize(&mut self, stream: &mut [u8]) -> usize {
        let count = (self.buffer.len() - self.offset).min(stream.len());
        if count > 0 {
            stream[..count].copy_from_slice(&self.buffer[self.offset..self.offset + count]);
            self.offset += count;
        }
        count
    }

    /// Offer an inbound event frame (packet tag included) to this exchange
    ///
    /// Returns the number of bytes consumed. Zero means the frame is not for
    /// this exchange, or is too short to tell; the exchange stays pending.
    pub fn deserialize(&mut self, frame: &[u8]) -> usize {
        let Some(header) = frame.get(1..).and_then(EventHeader::parse) else {
            return 0;
        };

        let start = 1 + HCI_EVENT_HDR_SIZE;
        let end = frame.len().min(start + header.parameter_length as usize);
        let parameters = &frame[start..end];

        let handled = match header.event_code {
            EVT_CMD_STATUS => self.command_status(parameters),
            EVT_CMD_COMPLETE => self.command_complete(parameters),
            EVT_LE_META_EVENT => self.le_meta_event(parameters),
            code if !self.kind.le_meta && code == self.kind.response_event => {
                if self.correlates(parameters) {
                    self.completion_event(parameters);
                    true
                } else {
                    log::trace!("event {:#04x} is for another link", code);
                    false
                }
            }
            _ => false,
        };

        if handled {
            frame.len()
        } else {
            0
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome.is_some()
    }

    /// Result of the exchange, `None` while pending
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn succeeded(&self) -> bool {
        self.outcome.map(|outcome| outcome.is_success()).unwrap_or(false)
    }

    /// Inbound payload, zero filled past whatever the event carried
    pub fn response(&self) -> &[u8] {
        &self.response
    }

    /// First byte of the inbound payload
    ///
    /// For Command Complete return parameters this is the controller status.
    pub fn return_status(&self) -> Option<u8> {
        if self.is_completed() {
            self.response.first().copied()
        } else {
            None
        }
    }

    fn fill_payload(&mut self, payload: &[u8]) {
        let size = payload.len().min(self.kind.outbound_size);
        self.buffer[HCI_COMMAND_HDR_SIZE..HCI_COMMAND_HDR_SIZE + size]
            .copy_from_slice(&payload[..size]);
    }

    fn store_response(&mut self, data: &[u8]) {
        let count = data.len().min(self.response.len());
        self.response[..count].copy_from_slice(&data[..count]);
    }

    fn command_status(&mut self, parameters: &[u8]) -> bool {
        if parameters.len() < EVT_CMD_STATUS_SIZE {
            return false;
        }

        let status = parameters[0];
        let command = LittleEndian::read_u16(&parameters[2..4]);

        if command != self.kind.opcode {
            log::debug!(
                "ignoring command status for {:X}-{:03X} (status {})",
                ogf(command),
                ocf(command),
                status
            );
            return false;
        }

        log::debug!(
            "command status for {:X}-{:03X} (status {})",
            ogf(command),
            ocf(command),
            status
        );

        self.outcome = Some(if status == HCI_SUCCESS {
            Outcome::Success
        } else {
            Outcome::Status(status)
        });

        true
    }

    fn command_complete(&mut self, parameters: &[u8]) -> bool {
        if parameters.len() < EVT_CMD_COMPLETE_SIZE {
            return false;
        }

        let command = LittleEndian::read_u16(&parameters[1..3]);

        if command != self.kind.opcode {
            log::debug!(
                "ignoring command complete for {:X}-{:03X}",
                ogf(command),
                ocf(command)
            );
            return false;
        }

        if parameters.len() == EVT_CMD_COMPLETE_SIZE {
            self.outcome = Some(Outcome::Malformed);
        } else {
            self.store_response(&parameters[EVT_CMD_COMPLETE_SIZE..]);
            self.outcome = Some(Outcome::Success);
        }

        log::debug!(
            "command complete for {:X}-{:03X}: {:?}",
            ogf(command),
            ocf(command),
            self.outcome
        );

        true
    }

    fn le_meta_event(&mut self, parameters: &[u8]) -> bool {
        if ogf(self.kind.opcode) != OGF_LE
            || !self.kind.le_meta
            || parameters.len() < EVT_LE_META_EVENT_SIZE
        {
            return false;
        }

        if parameters[0] != self.kind.response_event {
            log::trace!("ignoring LE sub-event {:#04x}", parameters[0]);
            return false;
        }

        if !self.correlates(&parameters[EVT_LE_META_EVENT_SIZE..]) {
            log::trace!("LE sub-event {:#04x} is for another link", parameters[0]);
            return false;
        }

        self.store_response(&parameters[EVT_LE_META_EVENT_SIZE..]);
        self.outcome = Some(Outcome::Success);
        true
    }

    /// Whether a completion event names the link or peer this command targets
    ///
    /// Only checked for the kinds whose parameters start with a handle or a
    /// peer address; everything else matches on the event code alone.
    fn correlates(&self, parameters: &[u8]) -> bool {
        let payload = self.payload();
        let (sent, received) = match self.kind.response_event {
            EVT_CONN_COMPLETE if !self.kind.le_meta => (payload.get(0..6), parameters.get(3..9)),
            EVT_REMOTE_NAME_REQ_COMPLETE => (payload.get(0..6), parameters.get(1..7)),
            EVT_DISCONN_COMPLETE | EVT_AUTH_COMPLETE | EVT_ENCRYPTION_CHANGE => {
                return handle_at(payload, 0) == handle_at(parameters, 1);
            }
            EVT_LE_READ_REMOTE_USED_FEATURES_COMPLETE if self.kind.le_meta => {
                return handle_at(payload, 0) == handle_at(parameters, 1);
            }
            // The peer address is ignored when connecting from the white list
            EVT_LE_CONN_COMPLETE if self.kind.le_meta && payload.get(4) == Some(&0) => {
                (payload.get(6..12), parameters.get(5..11))
            }
            _ => return true,
        };
        sent.is_some() && sent == received
    }

    fn completion_event(&mut self, parameters: &[u8]) {
        self.store_response(parameters);
        self.outcome = Some(match parameters.first() {
            Some(&HCI_SUCCESS) => Outcome::Success,
            Some(&status) => Outcome::Status(status),
            None => Outcome::Malformed,
        });
    }
}

// Connection handles are 12 bits; the top nibble carries flags
fn handle_at(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|bytes| LittleEndian::read_u16(bytes) & 0x0FFF)
}

/// A typed outbound parameter block for one command kind
pub trait CommandParameters {
    const KIND: &'static CommandKind;

    /// Append the wire form of the parameters to `buffer`
    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError>;
}

pub const CONNECT: CommandKind = CommandKind {
    name: "Create Connection",
    opcode: opcode(OGF_LINK_CTL, OCF_CREATE_CONNECTION),
    response_event: EVT_CONN_COMPLETE,
    le_meta: false,
    outbound_size: 13,
    inbound_size: 11,
};

pub const AUTHENTICATE: CommandKind = CommandKind {
    name: "Authentication Requested",
    opcode: opcode(OGF_LINK_CTL, OCF_AUTH_REQUESTED),
    response_event: EVT_AUTH_COMPLETE,
    le_meta: false,
    outbound_size: 2,
    inbound_size: 3,
};

pub const DISCONNECT: CommandKind = CommandKind {
    name: "Disconnect",
    opcode: opcode(OGF_LINK_CTL, OCF_DISCONNECT),
    response_event: EVT_DISCONN_COMPLETE,
    le_meta: false,
    outbound_size: 3,
    inbound_size: 4,
};

pub const CONNECT_LE: CommandKind = CommandKind {
    name: "LE Create Connection",
    opcode: opcode(OGF_LE, OCF_LE_CREATE_CONNECTION),
    response_event: EVT_LE_CONN_COMPLETE,
    le_meta: true,
    outbound_size: 25,
    inbound_size: 18,
};

pub const ENCRYPT_LE: CommandKind = CommandKind {
    name: "LE Start Encryption",
    opcode: opcode(OGF_LE, OCF_LE_START_ENCRYPTION),
    response_event: EVT_ENCRYPTION_CHANGE,
    le_meta: false,
    outbound_size: 28,
    inbound_size: 4,
};

pub const REMOTE_NAME: CommandKind = CommandKind {
    name: "Remote Name Request",
    opcode: opcode(OGF_LINK_CTL, OCF_REMOTE_NAME_REQ),
    response_event: EVT_REMOTE_NAME_REQ_COMPLETE,
    le_meta: false,
    outbound_size: 10,
    inbound_size: 255,
};

pub const SCAN_PARAMETERS_LE: CommandKind = CommandKind {
    name: "LE Set Scan Parameters",
    opcode: opcode(OGF_LE, OCF_LE_SET_SCAN_PARAMETERS),
    response_event: EVT_CMD_COMPLETE,
    le_meta: false,
    outbound_size: 7,
    inbound_size: 1,
};

pub const SCAN_ENABLE_LE: CommandKind = CommandKind {
    name: "LE Set Scan Enable",
    opcode: opcode(OGF_LE, OCF_LE_SET_SCAN_ENABLE),
    response_event: EVT_CMD_COMPLETE,
    le_meta: false,
    outbound_size: 2,
    inbound_size: 1,
};

pub const CLEAR_WHITE_LIST: CommandKind = CommandKind {
    name: "LE Clear White List",
    opcode: opcode(OGF_LE, OCF_LE_CLEAR_WHITE_LIST),
    response_event: EVT_CMD_STATUS,
    le_meta: false,
    outbound_size: 0,
    inbound_size: 1,
};

pub const READ_WHITE_LIST_SIZE: CommandKind = CommandKind {
    name: "LE Read White List Size",
    opcode: opcode(OGF_LE, OCF_LE_READ_WHITE_LIST_SIZE),
    response_event: EVT_CMD_STATUS,
    le_meta: false,
    outbound_size: 0,
    inbound_size: 2,
};

pub const ADD_DEVICE_TO_WHITE_LIST: CommandKind = CommandKind {
    name: "LE Add Device To White List",
    opcode: opcode(OGF_LE, OCF_LE_ADD_DEVICE_TO_WHITE_LIST),
    response_event: EVT_CMD_STATUS,
    le_meta: false,
    outbound_size: 7,
    inbound_size: 1,
};

pub const REMOVE_DEVICE_FROM_WHITE_LIST: CommandKind = CommandKind {
    name: "LE Remove Device From White List",
    opcode: opcode(OGF_LE, OCF_LE_REMOVE_DEVICE_FROM_WHITE_LIST),
    response_event: EVT_CMD_STATUS,
    le_meta: false,
    outbound_size: 7,
    inbound_size: 1,
};

pub const REMOTE_FEATURES_LE: CommandKind = CommandKind {
    name: "LE Read Remote Features",
    opcode: opcode(OGF_LE, OCF_LE_READ_REMOTE_USED_FEATURES),
    response_event: EVT_LE_READ_REMOTE_USED_FEATURES_COMPLETE,
    le_meta: true,
    outbound_size: 2,
    inbound_size: 11,
};

pub const ADVERTISING_PARAMETERS_LE: CommandKind = CommandKind {
    name: "LE Set Advertising Parameters",
    opcode: opcode(OGF_LE, OCF_LE_SET_ADVERTISING_PARAMETERS),
    response_event: EVT_CMD_COMPLETE,
    le_meta: false,
    outbound_size: 15,
    inbound_size: 1,
};

pub const ADVERTISING_ENABLE_LE: CommandKind = CommandKind {
    name: "LE Set Advertising Enable",
    opcode: opcode(OGF_LE, OCF_LE_SET_ADVERTISING_ENABLE),
    response_event: EVT_CMD_COMPLETE,
    le_meta: false,
    outbound_size: 1,
    inbound_size: 1,
};

pub const INQUIRY: CommandKind = CommandKind {
    name: "Inquiry",
    opcode: opcode(OGF_LINK_CTL, OCF_INQUIRY),
    response_event: EVT_CMD_STATUS,
    le_meta: false,
    outbound_size: 5,
    inbound_size: 0,
};

pub const INQUIRY_CANCEL: CommandKind = CommandKind {
    name: "Inquiry Cancel",
    opcode: opcode(OGF_LINK_CTL, OCF_INQUIRY_CANCEL),
    response_event: EVT_CMD_COMPLETE,
    le_meta: false,
    outbound_size: 0,
    inbound_size: 1,
};
