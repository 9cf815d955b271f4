//! Typed parameter blocks for the command kinds
//!
//! Outbound blocks implement [`CommandParameters`] and are turned into an
//! exchange with [`CommandExchange::with_parameters`]. Inbound blocks parse the
//! payload an exchange kept from its completing event.

use crate::error::HciError;
use crate::gap::{Address, FeatureIterator};
use crate::hci::command::*;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

fn address_bytes(address: &Address) -> Result<[u8; 6], HciError> {
    address
        .data()
        .copied()
        .ok_or_else(|| HciError::InvalidAddress(String::from("unset address")))
}

fn read_address(cursor: &mut Cursor<&[u8]>) -> Option<Address> {
    let mut bytes = [0u8; 6];
    cursor.read_exact(&mut bytes).ok()?;
    Some(Address::new(bytes))
}

/// Create Connection (BR/EDR)
#[derive(Debug, Clone)]
pub struct CreateConnection {
    pub address: Address,
    pub packet_type: u16,
    pub page_scan_repetition_mode: u8,
    pub clock_offset: u16,
    pub allow_role_switch: bool,
}

impl CommandParameters for CreateConnection {
    const KIND: &'static CommandKind = &CONNECT;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&address_bytes(&self.address)?);
        buffer.extend_from_slice(&self.packet_type.to_le_bytes());
        buffer.push(self.page_scan_repetition_mode);
        buffer.push(0x00); // reserved
        buffer.extend_from_slice(&self.clock_offset.to_le_bytes());
        buffer.push(self.allow_role_switch as u8);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AuthenticationRequested {
    pub handle: u16,
}

impl CommandParameters for AuthenticationRequested {
    const KIND: &'static CommandKind = &AUTHENTICATE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.handle.to_le_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Disconnect {
    pub handle: u16,
    pub reason: u8,
}

impl CommandParameters for Disconnect {
    const KIND: &'static CommandKind = &DISCONNECT;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.handle.to_le_bytes());
        buffer.push(self.reason);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LeCreateConnection {
    pub scan_interval: u16,
    pub scan_window: u16,
    pub initiator_filter: u8,
    pub peer_address_type: u8,
    pub peer_address: Address,
    pub own_address_type: u8,
    pub min_interval: u16,
    pub max_interval: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
    pub min_ce_length: u16,
    pub max_ce_length: u16,
}

impl CommandParameters for LeCreateConnection {
    const KIND: &'static CommandKind = &CONNECT_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.scan_interval.to_le_bytes());
        buffer.extend_from_slice(&self.scan_window.to_le_bytes());
        buffer.push(self.initiator_filter);
        buffer.push(self.peer_address_type);
        buffer.extend_from_slice(&address_bytes(&self.peer_address)?);
        buffer.push(self.own_address_type);
        buffer.extend_from_slice(&self.min_interval.to_le_bytes());
        buffer.extend_from_slice(&self.max_interval.to_le_bytes());
        buffer.extend_from_slice(&self.latency.to_le_bytes());
        buffer.extend_from_slice(&self.supervision_timeout.to_le_bytes());
        buffer.extend_from_slice(&self.min_ce_length.to_le_bytes());
        buffer.extend_from_slice(&self.max_ce_length.to_le_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LeStartEncryption {
    pub handle: u16,
    pub random: u64,
    pub diversifier: u16,
    pub long_term_key: [u8; 16],
}

impl CommandParameters for LeStartEncryption {
    const KIND: &'static CommandKind = &ENCRYPT_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.handle.to_le_bytes());
        buffer.extend_from_slice(&self.random.to_le_bytes());
        buffer.extend_from_slice(&self.diversifier.to_le_bytes());
        buffer.extend_from_slice(&self.long_term_key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RemoteNameRequest {
    pub address: Address,
    pub page_scan_repetition_mode: u8,
    pub clock_offset: u16,
}

impl CommandParameters for RemoteNameRequest {
    const KIND: &'static CommandKind = &REMOTE_NAME;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&address_bytes(&self.address)?);
        buffer.push(self.page_scan_repetition_mode);
        buffer.push(0x00); // reserved
        buffer.extend_from_slice(&self.clock_offset.to_le_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeSetScanParameters {
    pub scan_type: u8,
    pub interval: u16,
    pub window: u16,
    pub own_address_type: u8,
    pub filter_policy: u8,
}

impl CommandParameters for LeSetScanParameters {
    const KIND: &'static CommandKind = &SCAN_PARAMETERS_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.push(self.scan_type);
        buffer.extend_from_slice(&self.interval.to_le_bytes());
        buffer.extend_from_slice(&self.window.to_le_bytes());
        buffer.push(self.own_address_type);
        buffer.push(self.filter_policy);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeSetScanEnable {
    pub enable: bool,
    pub filter_duplicates: bool,
}

impl CommandParameters for LeSetScanEnable {
    const KIND: &'static CommandKind = &SCAN_ENABLE_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.push(self.enable as u8);
        buffer.push(self.filter_duplicates as u8);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LeAddDeviceToWhiteList {
    pub address_type: u8,
    pub address: Address,
}

impl CommandParameters for LeAddDeviceToWhiteList {
    const KIND: &'static CommandKind = &ADD_DEVICE_TO_WHITE_LIST;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.push(self.address_type);
        buffer.extend_from_slice(&address_bytes(&self.address)?);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LeRemoveDeviceFromWhiteList {
    pub address_type: u8,
    pub address: Address,
}

impl CommandParameters for LeRemoveDeviceFromWhiteList {
    const KIND: &'static CommandKind = &REMOVE_DEVICE_FROM_WHITE_LIST;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.push(self.address_type);
        buffer.extend_from_slice(&address_bytes(&self.address)?);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeReadRemoteFeatures {
    pub handle: u16,
}

impl CommandParameters for LeReadRemoteFeatures {
    const KIND: &'static CommandKind = &REMOTE_FEATURES_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.handle.to_le_bytes());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LeSetAdvertisingParameters {
    pub min_interval: u16,
    pub max_interval: u16,
    pub advertising_type: u8,
    pub own_address_type: u8,
    pub direct_address_type: u8,
    pub direct_address: Address,
    pub channel_map: u8,
    pub filter_policy: u8,
}

impl CommandParameters for LeSetAdvertisingParameters {
    const KIND: &'static CommandKind = &ADVERTISING_PARAMETERS_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.min_interval.to_le_bytes());
        buffer.extend_from_slice(&self.max_interval.to_le_bytes());
        buffer.push(self.advertising_type);
        buffer.push(self.own_address_type);
        buffer.push(self.direct_address_type);
        buffer.extend_from_slice(&address_bytes(&self.direct_address)?);
        buffer.push(self.channel_map);
        buffer.push(self.filter_policy);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeSetAdvertisingEnable {
    pub enable: bool,
}

impl CommandParameters for LeSetAdvertisingEnable {
    const KIND: &'static CommandKind = &ADVERTISING_ENABLE_LE;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.push(self.enable as u8);
        Ok(())
    }
}

/// Inquiry, `length` in units of 1.28 s
#[derive(Debug, Clone, Copy)]
pub struct Inquiry {
    pub lap: u32,
    pub length: u8,
    pub num_responses: u8,
}

impl CommandParameters for Inquiry {
    const KIND: &'static CommandKind = &INQUIRY;

    fn encode(&self, buffer: &mut Vec<u8>) -> Result<(), HciError> {
        buffer.extend_from_slice(&self.lap.to_le_bytes()[..3]);
        buffer.push(self.length);
        buffer.push(self.num_responses);
        Ok(())
    }
}

/// Connection Complete event parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionComplete {
    pub status: u8,
    pub handle: u16,
    pub address: Address,
    pub link_type: u8,
    pub encryption_enabled: bool,
}

impl ConnectionComplete {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            handle: cursor.read_u16::<LittleEndian>().ok()?,
            address: read_address(&mut cursor)?,
            link_type: cursor.read_u8().ok()?,
            encryption_enabled: cursor.read_u8().ok()? != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticationComplete {
    pub status: u8,
    pub handle: u16,
}

impl AuthenticationComplete {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            handle: cursor.read_u16::<LittleEndian>().ok()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectionComplete {
    pub status: u8,
    pub handle: u16,
    pub reason: u8,
}

impl DisconnectionComplete {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            handle: cursor.read_u16::<LittleEndian>().ok()?,
            reason: cursor.read_u8().ok()?,
        })
    }
}

/// LE Connection Complete sub-event parameters (sub-event code stripped)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeConnectionComplete {
    pub status: u8,
    pub handle: u16,
    pub role: u8,
    pub peer_address_type: u8,
    pub peer_address: Address,
    pub interval: u16,
    pub latency: u16,
    pub supervision_timeout: u16,
    pub clock_accuracy: u8,
}

impl LeConnectionComplete {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            handle: cursor.read_u16::<LittleEndian>().ok()?,
            role: cursor.read_u8().ok()?,
            peer_address_type: cursor.read_u8().ok()?,
            peer_address: read_address(&mut cursor)?,
            interval: cursor.read_u16::<LittleEndian>().ok()?,
            latency: cursor.read_u16::<LittleEndian>().ok()?,
            supervision_timeout: cursor.read_u16::<LittleEndian>().ok()?,
            clock_accuracy: cursor.read_u8().ok()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncryptionChange {
    pub status: u8,
    pub handle: u16,
    pub enabled: bool,
}

impl EncryptionChange {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            handle: cursor.read_u16::<LittleEndian>().ok()?,
            enabled: cursor.read_u8().ok()? != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNameComplete {
    pub status: u8,
    pub address: Address,
    pub name: String,
}

impl RemoteNameComplete {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        let status = cursor.read_u8().ok()?;
        let address = read_address(&mut cursor)?;

        let raw = &data[7..];
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());

        Some(Self {
            status,
            address,
            name: String::from_utf8_lossy(&raw[..end]).into_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WhiteListSize {
    pub status: u8,
    pub size: u8,
}

impl WhiteListSize {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        Some(Self {
            status: cursor.read_u8().ok()?,
            size: cursor.read_u8().ok()?,
        })
    }
}

/// LE Read Remote Features Complete sub-event parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteFeatures {
    pub status: u8,
    pub handle: u16,
    pub features: FeatureIterator,
}

impl RemoteFeatures {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut cursor = Cursor::new(data);
        let status = cursor.read_u8().ok()?;
        let handle = cursor.read_u16::<LittleEndian>().ok()?;

        Some(Self {
            status,
            handle,
            features: FeatureIterator::new(&data[3..]),
        })
    }
}
