//! HCI packet structures and parsing
//!
//! This module contains the opcode helpers and the event framing shared by
//! the command exchanges and the channel.

use crate::hci::constants::*;
use byteorder::{ByteOrder, LittleEndian};

/// Pack an OGF/OCF pair into a command opcode
pub const fn opcode(ogf: u8, ocf: u16) -> u16 {
    ((ogf as u16) << 10) | (ocf & 0x03ff)
}

/// Opcode group of a command opcode
pub const fn ogf(opcode: u16) -> u8 {
    ((opcode >> 10) & 0x3f) as u8
}

/// Command field of a command opcode
pub const fn ocf(opcode: u16) -> u16 {
    opcode & 0x03ff
}

/// Common header in front of every HCI event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventHeader {
    pub event_code: u8,
    pub parameter_length: u8,
}

impl EventHeader {
    /// Parse the header from the bytes following the packet type tag
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < HCI_EVENT_HDR_SIZE {
            return None;
        }

        Some(EventHeader {
            event_code: data[0],
            parameter_length: data[1],
        })
    }
}

/// HCI Event packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HciEvent {
    pub event_code: u8,
    pub parameter_total_length: u8,
    pub parameters: Vec<u8>,
}

impl HciEvent {
    /// Parse an HCI event from raw bytes (without the packet type tag)
    pub fn parse(data: &[u8]) -> Option<Self> {
        let header = EventHeader::parse(data)?;
        let end = HCI_EVENT_HDR_SIZE + header.parameter_length as usize;

        if data.len() < end {
            return None;
        }

        Some(HciEvent {
            event_code: header.event_code,
            parameter_total_length: header.parameter_length,
            parameters: data[HCI_EVENT_HDR_SIZE..end].to_vec(),
        })
    }

    pub fn header(&self) -> EventHeader {
        EventHeader {
            event_code: self.event_code,
            parameter_length: self.parameter_total_length,
        }
    }

    /// Opcode carried by a Command Status or Command Complete event
    pub fn command_opcode(&self) -> Option<u16> {
        let offset = match self.event_code {
            EVT_CMD_STATUS => 2,
            EVT_CMD_COMPLETE => 1,
            _ => return None,
        };

        self.parameters
            .get(offset..offset + 2)
            .map(LittleEndian::read_u16)
    }

    /// Sub-event code of an LE Meta event
    pub fn subevent(&self) -> Option<u8> {
        if self.event_code == EVT_LE_META_EVENT {
            self.parameters.first().copied()
        } else {
            None
        }
    }

    /// Status byte of the event, where the event has one
    pub fn status(&self) -> Option<u8> {
        match self.event_code {
            EVT_CMD_COMPLETE => self.parameters.get(EVT_CMD_COMPLETE_SIZE).copied(),
            EVT_LE_META_EVENT => self.parameters.get(1).copied(),
            _ => self.parameters.first().copied(),
        }
    }
}
