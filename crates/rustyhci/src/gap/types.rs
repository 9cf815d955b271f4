use crate::error::HciError;
use crate::gap::constants::*;
use crate::hci::socket;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

const ADDRESS_LENGTH: u8 = 6;

/// Address type as understood by the management protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressType {
    #[default]
    BrEdr,
    LePublic,
    LeRandom,
}

impl From<u8> for AddressType {
    fn from(value: u8) -> Self {
        match value {
            BDADDR_LE_PUBLIC => AddressType::LePublic,
            BDADDR_LE_RANDOM => AddressType::LeRandom,
            _ => AddressType::BrEdr,
        }
    }
}

impl From<AddressType> for u8 {
    fn from(value: AddressType) -> Self {
        match value {
            AddressType::BrEdr => BDADDR_BREDR,
            AddressType::LePublic => BDADDR_LE_PUBLIC,
            AddressType::LeRandom => BDADDR_LE_RANDOM,
        }
    }
}

/// Input/output capabilities announced when pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IoCapability {
    DisplayOnly,
    DisplayYesNo,
    KeyboardOnly,
    #[default]
    NoInputNoOutput,
    KeyboardDisplay,
}

impl From<IoCapability> for u8 {
    fn from(value: IoCapability) -> Self {
        match value {
            IoCapability::DisplayOnly => IO_CAP_DISPLAY_ONLY,
            IoCapability::DisplayYesNo => IO_CAP_DISPLAY_YES_NO,
            IoCapability::KeyboardOnly => IO_CAP_KEYBOARD_ONLY,
            IoCapability::NoInputNoOutput => IO_CAP_NO_INPUT_NO_OUTPUT,
            IoCapability::KeyboardDisplay => IO_CAP_KEYBOARD_DISPLAY,
        }
    }
}

impl TryFrom<u8> for IoCapability {
    type Error = HciError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            IO_CAP_DISPLAY_ONLY => Ok(IoCapability::DisplayOnly),
            IO_CAP_DISPLAY_YES_NO => Ok(IoCapability::DisplayYesNo),
            IO_CAP_KEYBOARD_ONLY => Ok(IoCapability::KeyboardOnly),
            IO_CAP_NO_INPUT_NO_OUTPUT => Ok(IoCapability::NoInputNoOutput),
            IO_CAP_KEYBOARD_DISPLAY => Ok(IoCapability::KeyboardDisplay),
            _ => Err(HciError::Unsupported),
        }
    }
}

/// Bluetooth device address
///
/// The six bytes are kept in wire (storage) order, least significant byte
/// first. Text renders them the other way around, so the storage bytes
/// `[0x01, 0x02, 0x03, 0x04, 0x05, 0x06]` display as `06:05:04:03:02:01`.
///
/// An address carries a length next to its bytes. Only a length of six is a
/// usable address; anything else is the "unset" value returned when, for
/// example, no adapter could be queried.
#[derive(Clone, Copy, Default)]
pub struct Address {
    bytes: [u8; 6],
    length: u8,
}

impl Address {
    /// An unset address
    pub const fn invalid() -> Self {
        Self {
            bytes: [0; 6],
            length: 0,
        }
    }

    pub const fn new(bytes: [u8; 6]) -> Self {
        Self {
            bytes,
            length: ADDRESS_LENGTH,
        }
    }

    /// The wildcard address, all zeroes
    pub const fn any() -> Self {
        Self::new([0; 6])
    }

    /// The reserved address targeting the local adapter itself
    pub const fn local() -> Self {
        Self::new([0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF])
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        if slice.len() >= 6 {
            let mut bytes = [0u8; 6];
            bytes.copy_from_slice(&slice[0..6]);
            Some(Self::new(bytes))
        } else {
            None
        }
    }

    /// Address of the first adapter that is up, or an invalid address if
    /// the system has none
    pub fn default_adapter() -> Self {
        match socket::first_adapter() {
            Some(index) => Self::for_adapter(index),
            None => Self::invalid(),
        }
    }

    /// Address of the adapter with the given index, or an invalid address if
    /// the kernel does not know it
    pub fn for_adapter(index: u16) -> Self {
        match socket::adapter_info(index) {
            Ok(info) => Self::new(info.bdaddr),
            Err(e) => {
                log::debug!("no address for hci{}: {}", index, e);
                Self::invalid()
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.length == ADDRESS_LENGTH
    }

    /// Raw bytes in storage order, only for a valid address
    pub fn data(&self) -> Option<&[u8; 6]> {
        if self.is_valid() {
            Some(&self.bytes)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.length as usize
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Organizationally unique identifier, the top three bytes
    pub fn oui(&self) -> String {
        if !self.is_valid() {
            return String::new();
        }
        format!(
            "{:02X}:{:02X}:{:02X}",
            self.bytes[5], self.bytes[4], self.bytes[3]
        )
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self.bytes[..self.len()] == other.bytes[..other.len()]
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.length.hash(state);
        self.bytes[..self.len()].hash(state);
    }
}

impl From<[u8; 6]> for Address {
    fn from(bytes: [u8; 6]) -> Self {
        Self::new(bytes)
    }
}

impl FromStr for Address {
    type Err = HciError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(HciError::InvalidAddress(s.to_string()));
        }

        let mut bytes = [0u8; 6];
        for (index, part) in parts.iter().enumerate() {
            let mut byte = [0u8; 1];
            if part.len() != 2 || hex::decode_to_slice(part, &mut byte).is_err() {
                return Err(HciError::InvalidAddress(s.to_string()));
            }
            bytes[5 - index] = byte[0];
        }

        Ok(Self::new(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.bytes[5],
            self.bytes[4],
            self.bytes[3],
            self.bytes[2],
            self.bytes[1],
            self.bytes[0]
        )
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "Address({})", self)
        } else {
            write!(f, "Address(<invalid>)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_reverses_storage_order() {
        let addr = Address::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(addr.to_string(), "FF:EE:DD:CC:BB:AA");
        assert_eq!(addr.oui(), "FF:EE:DD");
    }

    #[test]
    fn test_text_round_trip() {
        let samples = [
            [0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB],
            [0xFF, 0xFE, 0x0A, 0xB0, 0x10, 0x7F],
        ];

        for bytes in samples {
            let addr = Address::new(bytes);
            let text = addr.to_string();
            assert_eq!(text.len(), 17);
            assert_eq!(text.parse::<Address>().unwrap(), addr);
        }
    }

    #[test]
    fn test_parse_accepts_lowercase() {
        let addr: Address = "0a:1b:2c:3d:4e:5f".parse().unwrap();
        assert_eq!(addr.data(), Some(&[0x5F, 0x4E, 0x3D, 0x2C, 0x1B, 0x0A]));
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        assert!("".parse::<Address>().is_err());
        assert!("00:11:22:33:44".parse::<Address>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<Address>().is_err());
        assert!("00:11:22:33:44:5".parse::<Address>().is_err());
        assert!("00:11:22:33:44:GG".parse::<Address>().is_err());
        assert!("001:1:22:33:44:55".parse::<Address>().is_err());
    }

    #[test]
    fn test_invalid_address() {
        let addr = Address::invalid();
        assert!(!addr.is_valid());
        assert_eq!(addr.to_string(), "");
        assert_eq!(addr.data(), None);
        assert_eq!(addr, Address::default());
        assert_ne!(addr, Address::any());
    }

    #[test]
    fn test_sentinels() {
        assert_eq!(Address::any().to_string(), "00:00:00:00:00:00");
        assert_eq!(Address::local().to_string(), "FF:FF:FF:00:00:00");
        assert_ne!(Address::any(), Address::local());
    }

    #[test]
    fn test_from_slice() {
        assert!(Address::from_slice(&[1, 2, 3]).is_none());
        let addr = Address::from_slice(&[1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert_eq!(addr, Address::new([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_io_capability_codes() {
        assert_eq!(u8::from(IoCapability::KeyboardDisplay), 0x04);
        assert_eq!(IoCapability::try_from(0x01).unwrap(), IoCapability::DisplayYesNo);
        assert!(IoCapability::try_from(0xFF).is_err());
        assert_eq!(AddressType::from(2), AddressType::LeRandom);
    }
}
