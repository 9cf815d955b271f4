//! Device discovery parsing
//!
//! This module turns the discovery events an adapter reports while scanning
//! (LE advertising reports and the three classic inquiry result events) into
//! discovered devices, and extracts device names from advertising / EIR data.

use crate::gap::{Address, ADV_TYPE_COMPLETE_LOCAL_NAME, ADV_TYPE_SHORT_LOCAL_NAME};
use crate::hci::constants::*;
use crate::hci::HciEvent;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// One report of an LE Advertising Report event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeAdvertisingReport {
    pub event_type: u8,
    pub address_type: u8,
    pub address: Address,
    pub data: Vec<u8>,
    pub rssi: i8,
}

impl LeAdvertisingReport {
    /// Parse every report of an LE Meta Event carrying advertising reports
    pub fn parse_from_meta_event(event: &HciEvent) -> Vec<Self> {
        if event.subevent() != Some(EVT_LE_ADVERTISING_REPORT) {
            return Vec::new();
        }

        let mut cursor = Cursor::new(&event.parameters[1..]);
        let Ok(count) = cursor.read_u8() else {
            return Vec::new();
        };

        let mut reports = Vec::with_capacity(count as usize);
        for _ in 0..count {
            match Self::read(&mut cursor) {
                Some(report) => reports.push(report),
                None => break,
            }
        }
        reports
    }

    fn read(cursor: &mut Cursor<&[u8]>) -> Option<Self> {
        let event_type = cursor.read_u8().ok()?;
        let address_type = cursor.read_u8().ok()?;
        let address = read_address(cursor)?;
        let length = cursor.read_u8().ok()? as usize;
        let mut data = vec![0u8; length];
        cursor.read_exact(&mut data).ok()?;
        let rssi = cursor.read_i8().ok()?;

        Some(LeAdvertisingReport {
            event_type,
            address_type,
            address,
            data,
            rssi,
        })
    }

    /// Advertised name, if the report carries one
    pub fn name(&self) -> Option<String> {
        eir_name(&self.data)
    }
}

/// One response of a classic inquiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryResult {
    pub address: Address,
    pub page_scan_repetition_mode: u8,
    pub class_of_device: u32,
    pub clock_offset: u16,
    /// Only the RSSI and extended variants report signal strength
    pub rssi: Option<i8>,
    /// Extended inquiry response data, empty for the plain variants
    pub eir: Vec<u8>,
}

impl InquiryResult {
    /// Parse Inquiry Result, Inquiry Result with RSSI and Extended Inquiry Result events
    pub fn parse_from_event(event: &HciEvent) -> Vec<Self> {
        let mut cursor = Cursor::new(event.parameters.as_slice());
        let Ok(count) = cursor.read_u8() else {
            return Vec::new();
        };

        let mut results = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let result = match event.event_code {
                EVT_INQUIRY_RESULT => Self::read_plain(&mut cursor),
                EVT_INQUIRY_RESULT_WITH_RSSI => Self::read_with_rssi(&mut cursor, false),
                EVT_EXTENDED_INQUIRY_RESULT => Self::read_with_rssi(&mut cursor, true),
                _ => None,
            };
            match result {
                Some(result) => results.push(result),
                None => break,
            }
        }
        results
    }

    fn read_plain(cursor: &mut Cursor<&[u8]>) -> Option<Self> {
        let address = read_address(cursor)?;
        let page_scan_repetition_mode = cursor.read_u8().ok()?;
        cursor.read_u16::<LittleEndian>().ok()?; // reserved
        let class_of_device = cursor.read_u24::<LittleEndian>().ok()?;
        let clock_offset = cursor.read_u16::<LittleEndian>().ok()?;

        Some(InquiryResult {
            address,
            page_scan_repetition_mode,
            class_of_device,
            clock_offset,
            rssi: None,
            eir: Vec::new(),
        })
    }

    fn read_with_rssi(cursor: &mut Cursor<&[u8]>, extended: bool) -> Option<Self> {
        let address = read_address(cursor)?;
        let page_scan_repetition_mode = cursor.read_u8().ok()?;
        cursor.read_u8().ok()?; // reserved
        let class_of_device = cursor.read_u24::<LittleEndian>().ok()?;
        let clock_offset = cursor.read_u16::<LittleEndian>().ok()?;
        let rssi = cursor.read_i8().ok()?;

        let mut eir = Vec::new();
        if extended {
            cursor.read_to_end(&mut eir).ok()?;
        }

        Some(InquiryResult {
            address,
            page_scan_repetition_mode,
            class_of_device,
            clock_offset,
            rssi: Some(rssi),
            eir,
        })
    }

    pub fn name(&self) -> Option<String> {
        eir_name(&self.eir)
    }
}

/// A device seen while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub low_energy: bool,
    pub address: Address,
    /// Empty when the device did not announce a name
    pub name: String,
}

/// Devices reported by a discovery event, empty for any other event
pub fn discovered_devices(event: &HciEvent) -> Vec<DiscoveredDevice> {
    match event.event_code {
        EVT_LE_META_EVENT => LeAdvertisingReport::parse_from_meta_event(event)
            .into_iter()
            .map(|report| DiscoveredDevice {
                low_energy: true,
                name: report.name().unwrap_or_default(),
                address: report.address,
            })
            .collect(),
        EVT_INQUIRY_RESULT | EVT_INQUIRY_RESULT_WITH_RSSI | EVT_EXTENDED_INQUIRY_RESULT => {
            InquiryResult::parse_from_event(event)
                .into_iter()
                .map(|result| DiscoveredDevice {
                    low_energy: false,
                    name: result.name().unwrap_or_default(),
                    address: result.address,
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

/// Whether the event reports discovered devices
pub fn is_discovery_event(event: &HciEvent) -> bool {
    match event.event_code {
        EVT_INQUIRY_RESULT | EVT_INQUIRY_RESULT_WITH_RSSI | EVT_EXTENDED_INQUIRY_RESULT => true,
        EVT_LE_META_EVENT => event.subevent() == Some(EVT_LE_ADVERTISING_REPORT),
        _ => false,
    }
}

/// Parse advertisement data from a LE Advertising Report
///
/// # Arguments
///
/// * `data` - The advertisement data
///
/// # Returns
///
/// A vector of (type, data) tuples
pub fn parse_advertising_data(data: &[u8]) -> Vec<(u8, Vec<u8>)> {
    let mut result = Vec::new();
    let mut i = 0;

    while i < data.len() {
        let length = data[i] as usize;
        if length == 0 || i + length >= data.len() {
            break;
        }

        let ad_type = data[i + 1];
        let ad_data = data[i + 2..i + 1 + length].to_vec();

        result.push((ad_type, ad_data));

        i += 1 + length;
    }

    result
}

/// Device name carried in advertising or EIR data
///
/// A complete local name wins over a shortened one.
pub fn eir_name(data: &[u8]) -> Option<String> {
    let records = parse_advertising_data(data);

    let record = records
        .iter()
        .find(|(ad_type, _)| *ad_type == ADV_TYPE_COMPLETE_LOCAL_NAME)
        .or_else(|| {
            records
                .iter()
                .find(|(ad_type, _)| *ad_type == ADV_TYPE_SHORT_LOCAL_NAME)
        })?;

    let end = record.1.iter().position(|&b| b == 0).unwrap_or(record.1.len());
    Some(String::from_utf8_lossy(&record.1[..end]).into_owned())
}

fn read_address(cursor: &mut Cursor<&[u8]>) -> Option<Address> {
    let mut bytes = [0u8; 6];
    cursor.read_exact(&mut bytes).ok()?;
    Some(Address::new(bytes))
}
