//! Management command exchanges
//!
//! A [`ManagementExchange`] carries one command to the kernel's management
//! interface and collects the command complete or command status event that
//! answers it. Inbound bytes may arrive split across several reads; the
//! header is accumulated first and then the parameter block it announces.

use crate::error::HciError;
use crate::gap::{Address, AddressType, IoCapability};
use crate::mgmt::constants::*;
use byteorder::{ByteOrder, LittleEndian};

/// One outstanding management command
#[derive(Debug)]
pub struct ManagementExchange {
    opcode: u16,
    index: u16,
    outbound: Vec<u8>,
    offset: usize,
    sent: bool,
    inbound: Vec<u8>,
    finished: bool,
    unsupported: Option<u16>,
}

impl ManagementExchange {
    /// Build a command for adapter `index` carrying `parameters`
    pub fn new(opcode: u16, index: u16, parameters: &[u8]) -> Self {
        let length = parameters.len().min(MGMT_MAX_PARAM_LEN);
        let mut outbound = Vec::with_capacity(MGMT_HDR_SIZE + length);
        outbound.extend_from_slice(&opcode.to_le_bytes());
        outbound.extend_from_slice(&index.to_le_bytes());
        outbound.extend_from_slice(&(length as u16).to_le_bytes());
        outbound.extend_from_slice(&parameters[..length]);

        Self {
            opcode,
            index,
            outbound,
            offset: 0,
            sent: false,
            inbound: Vec::with_capacity(MGMT_HDR_SIZE),
            finished: false,
            unsupported: None,
        }
    }

    /// A single boolean mode toggle such as Set Powered or Set LE
    pub fn set_mode(opcode: u16, index: u16, enabled: bool) -> Self {
        Self::new(opcode, index, &[enabled as u8])
    }

    pub fn set_powered(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_POWERED, index, enabled)
    }

    pub fn set_bondable(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_BONDABLE, index, enabled)
    }

    pub fn set_advertising(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_ADVERTISING, index, enabled)
    }

    pub fn set_simple_pairing(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_SSP, index, enabled)
    }

    pub fn set_low_energy(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_LE, index, enabled)
    }

    pub fn set_secure_connections(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_SECURE_CONN, index, enabled)
    }

    pub fn set_connectable(index: u16, enabled: bool) -> Self {
        Self::set_mode(MGMT_OP_SET_CONNECTABLE, index, enabled)
    }

    /// Set Discoverable, `timeout` in seconds (zero for no timeout)
    pub fn set_discoverable(index: u16, mode: u8, timeout: u16) -> Self {
        let mut parameters = [0u8; 3];
        parameters[0] = mode;
        LittleEndian::write_u16(&mut parameters[1..], timeout);
        Self::new(MGMT_OP_SET_DISCOVERABLE, index, &parameters)
    }

    pub fn pair_device(
        index: u16,
        address: &Address,
        address_type: AddressType,
        capability: IoCapability,
    ) -> Result<Self, HciError> {
        let mut parameters = Vec::with_capacity(8);
        push_address(&mut parameters, address, address_type)?;
        parameters.push(capability.into());
        Ok(Self::new(MGMT_OP_PAIR_DEVICE, index, &parameters))
    }

    pub fn cancel_pair_device(
        index: u16,
        address: &Address,
        address_type: AddressType,
    ) -> Result<Self, HciError> {
        let mut parameters = Vec::with_capacity(7);
        push_address(&mut parameters, address, address_type)?;
        Ok(Self::new(MGMT_OP_CANCEL_PAIR_DEVICE, index, &parameters))
    }

    /// Unpair Device; `disconnect` also drops an existing link
    pub fn unpair_device(
        index: u16,
        address: &Address,
        address_type: AddressType,
        disconnect: bool,
    ) -> Result<Self, HciError> {
        let mut parameters = Vec::with_capacity(8);
        push_address(&mut parameters, address, address_type)?;
        parameters.push(disconnect as u8);
        Ok(Self::new(MGMT_OP_UNPAIR_DEVICE, index, &parameters))
    }

    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    /// Whether inbound management `data` belongs to this exchange
    ///
    /// Only a command complete or command status for this opcode on this
    /// adapter qualifies, or the rest of an answer already being collected.
    /// Fields the data is too short to carry are not held against it.
    pub fn answers(&self, data: &[u8]) -> bool {
        if self.finished || data.is_empty() {
            return false;
        }
        if !self.inbound.is_empty() {
            return true;
        }

        let field = |at: usize| data.get(at..at + 2).map(LittleEndian::read_u16);
        let event = field(0).map_or(true, |event| {
            event == MGMT_EV_CMD_COMPLETE || event == MGMT_EV_CMD_STATUS
        });
        let index = field(2).map_or(true, |index| index == self.index);
        let opcode = field(MGMT_HDR_SIZE).map_or(true, |opcode| opcode == self.opcode);

        event && index && opcode
    }

    /// Header and parameters as they go out
    pub fn packet(&self) -> &[u8] {
        &self.outbound
    }

    /// Copy the next piece of the command into `stream`
    ///
    /// Once the last piece went out the cursor rewinds and further calls
    /// return zero until [`reload`](Self::reload).
    pub fn serialize(&mut self, stream: &mut [u8]) -> usize {
        if self.sent {
            return 0;
        }

        let count = (self.outbound.len() - self.offset).min(stream.len());
        stream[..count].copy_from_slice(&self.outbound[self.offset..self.offset + count]);
        self.offset += count;

        if self.offset == self.outbound.len() {
            self.offset = 0;
            self.sent = true;
        }
        count
    }

    /// Make the exchange ready to be sent and answered again
    pub fn reload(&mut self) {
        self.offset = 0;
        self.sent = false;
        self.inbound.clear();
        self.finished = false;
        self.unsupported = None;
    }

    /// Offer inbound bytes to this exchange
    ///
    /// Returns the number of bytes taken. A frame may be delivered in pieces;
    /// bytes are taken until the header and the parameter block it announces
    /// are complete.
    pub fn deserialize(&mut self, data: &[u8]) -> usize {
        if self.finished {
            return 0;
        }

        let mut consumed = 0;

        if self.inbound.len() < MGMT_HDR_SIZE {
            consumed = (MGMT_HDR_SIZE - self.inbound.len()).min(data.len());
            self.inbound.extend_from_slice(&data[..consumed]);

            if self.inbound.len() < MGMT_HDR_SIZE {
                return consumed;
            }

            let event = LittleEndian::read_u16(&self.inbound[0..2]);
            if event != MGMT_EV_CMD_COMPLETE && event != MGMT_EV_CMD_STATUS {
                log::warn!(
                    "{}: unsupported management event {:#06x}",
                    opcode_name(self.opcode),
                    event
                );
                self.unsupported = Some(event);
                self.finished = true;
                return consumed;
            }
        }

        let expected = MGMT_HDR_SIZE + self.parameter_length();
        let count = (expected - self.inbound.len()).min(data.len() - consumed);
        self.inbound
            .extend_from_slice(&data[consumed..consumed + count]);
        consumed += count;

        if self.inbound.len() == expected {
            self.finish();
        }

        consumed
    }

    fn parameter_length(&self) -> usize {
        LittleEndian::read_u16(&self.inbound[4..6]) as usize
    }

    fn finish(&mut self) {
        self.finished = true;

        match self.status() {
            Some(MGMT_STATUS_SUCCESS) => {}
            Some(status) => log::warn!(
                "{} failed: {} ({:#04x})",
                opcode_name(self.response_opcode().unwrap_or(self.opcode)),
                status_name(status),
                status
            ),
            None => log::warn!("{}: truncated response", opcode_name(self.opcode)),
        }
    }

    fn parameters(&self) -> &[u8] {
        self.inbound.get(MGMT_HDR_SIZE..).unwrap_or(&[])
    }

    pub fn is_completed(&self) -> bool {
        self.finished
    }

    /// Event code of the answer once its header arrived
    pub fn event(&self) -> Option<u16> {
        self.inbound
            .get(0..2)
            .filter(|_| self.inbound.len() >= MGMT_HDR_SIZE)
            .map(LittleEndian::read_u16)
    }

    /// Event code that ended the exchange without being understood
    pub fn unsupported_event(&self) -> Option<u16> {
        self.unsupported
    }

    /// Opcode the answer refers to
    pub fn response_opcode(&self) -> Option<u16> {
        if !self.finished || self.unsupported.is_some() {
            return None;
        }
        self.parameters().get(0..2).map(LittleEndian::read_u16)
    }

    /// Raw status of the answer
    pub fn status(&self) -> Option<u8> {
        if !self.finished || self.unsupported.is_some() {
            return None;
        }
        self.parameters().get(2).copied()
    }

    /// Return parameters following opcode and status
    pub fn response(&self) -> &[u8] {
        if !self.finished {
            return &[];
        }
        self.parameters().get(MGMT_EV_CMD_HDR_SIZE..).unwrap_or(&[])
    }

    /// Whether the answer is for this command and reports success
    pub fn success(&self) -> bool {
        self.response_opcode() == Some(self.opcode) && self.status() == Some(MGMT_STATUS_SUCCESS)
    }
}

fn push_address(
    parameters: &mut Vec<u8>,
    address: &Address,
    address_type: AddressType,
) -> Result<(), HciError> {
    let bytes = address
        .data()
        .ok_or_else(|| HciError::InvalidAddress(String::from("unset address")))?;
    parameters.extend_from_slice(bytes);
    parameters.push(address_type.into());
    Ok(())
}
