//! Management protocol constants
//!
//! Opcodes, event codes and status codes of the kernel's Bluetooth management
//! interface, plus the name tables used when logging them.

// Event/opcode + adapter index + parameter length
pub const MGMT_HDR_SIZE: usize = 6;
// Opcode + status in front of command complete/status parameters
pub const MGMT_EV_CMD_HDR_SIZE: usize = 3;
pub const MGMT_MAX_PARAM_LEN: usize = u16::MAX as usize;

pub const MGMT_INDEX_NONE: u16 = 0xFFFF;

// Commands
pub const MGMT_OP_READ_VERSION: u16 = 0x0001;
pub const MGMT_OP_READ_INDEX_LIST: u16 = 0x0003;
pub const MGMT_OP_READ_INFO: u16 = 0x0004;
pub const MGMT_OP_SET_POWERED: u16 = 0x0005;
pub const MGMT_OP_SET_DISCOVERABLE: u16 = 0x0006;
pub const MGMT_OP_SET_CONNECTABLE: u16 = 0x0007;
pub const MGMT_OP_SET_BONDABLE: u16 = 0x0009;
pub const MGMT_OP_SET_SSP: u16 = 0x000B;
pub const MGMT_OP_SET_LE: u16 = 0x000D;
pub const MGMT_OP_PAIR_DEVICE: u16 = 0x0019;
pub const MGMT_OP_CANCEL_PAIR_DEVICE: u16 = 0x001A;
pub const MGMT_OP_UNPAIR_DEVICE: u16 = 0x001B;
pub const MGMT_OP_SET_ADVERTISING: u16 = 0x0029;
pub const MGMT_OP_SET_SECURE_CONN: u16 = 0x002D;

// Events
pub const MGMT_EV_CMD_COMPLETE: u16 = 0x0001;
pub const MGMT_EV_CMD_STATUS: u16 = 0x0002;
pub const MGMT_EV_CONTROLLER_ERROR: u16 = 0x0003;
pub const MGMT_EV_INDEX_ADDED: u16 = 0x0004;
pub const MGMT_EV_INDEX_REMOVED: u16 = 0x0005;
pub const MGMT_EV_NEW_SETTINGS: u16 = 0x0006;

// Statuses
pub const MGMT_STATUS_SUCCESS: u8 = 0x00;
pub const MGMT_STATUS_UNKNOWN_COMMAND: u8 = 0x01;
pub const MGMT_STATUS_NOT_CONNECTED: u8 = 0x02;
pub const MGMT_STATUS_FAILED: u8 = 0x03;
pub const MGMT_STATUS_CONNECT_FAILED: u8 = 0x04;
pub const MGMT_STATUS_AUTH_FAILED: u8 = 0x05;
pub const MGMT_STATUS_NOT_PAIRED: u8 = 0x06;
pub const MGMT_STATUS_NO_RESOURCES: u8 = 0x07;
pub const MGMT_STATUS_TIMEOUT: u8 = 0x08;
pub const MGMT_STATUS_ALREADY_CONNECTED: u8 = 0x09;
pub const MGMT_STATUS_BUSY: u8 = 0x0A;
pub const MGMT_STATUS_REJECTED: u8 = 0x0B;
pub const MGMT_STATUS_NOT_SUPPORTED: u8 = 0x0C;
pub const MGMT_STATUS_INVALID_PARAMS: u8 = 0x0D;
pub const MGMT_STATUS_DISCONNECTED: u8 = 0x0E;
pub const MGMT_STATUS_NOT_POWERED: u8 = 0x0F;
pub const MGMT_STATUS_CANCELLED: u8 = 0x10;
pub const MGMT_STATUS_INVALID_INDEX: u8 = 0x11;
pub const MGMT_STATUS_RFKILLED: u8 = 0x12;
pub const MGMT_STATUS_ALREADY_PAIRED: u8 = 0x13;
pub const MGMT_STATUS_PERMISSION_DENIED: u8 = 0x14;

// Discoverable modes
pub const MGMT_DISCOVERABLE_OFF: u8 = 0x00;
pub const MGMT_DISCOVERABLE_GENERAL: u8 = 0x01;
pub const MGMT_DISCOVERABLE_LIMITED: u8 = 0x02;

const OPCODE_NAMES: [&str; 46] = [
    "<0x0000>",
    "Read Version",
    "Read Commands",
    "Read Index List",
    "Read Controller Info",
    "Set Powered",
    "Set Discoverable",
    "Set Connectable",
    "Set Fast Connectable",
    "Set Bondable",
    "Set Link Security",
    "Set Secure Simple Pairing",
    "Set High Speed",
    "Set Low Energy",
    "Set Device Class",
    "Set Local Name",
    "Add UUID",
    "Remove UUID",
    "Load Link Keys",
    "Load Long Term Keys",
    "Disconnect",
    "Get Connections",
    "PIN Code Reply",
    "PIN Code Negative Reply",
    "Set IO Capability",
    "Pair Device",
    "Cancel Pair Device",
    "Unpair Device",
    "User Confirmation Reply",
    "User Confirmation Negative Reply",
    "User Passkey Reply",
    "User Passkey Negative Reply",
    "Read Local Out Of Band Data",
    "Add Remote Out Of Band Data",
    "Remove Remote Out Of Band Data",
    "Start Discovery",
    "Stop Discovery",
    "Confirm Name",
    "Block Device",
    "Unblock Device",
    "Set Device ID",
    "Set Advertising",
    "Set BR/EDR",
    "Set Static Address",
    "Set Scan Parameters",
    "Set Secure Connections",
];

const STATUS_NAMES: [&str; 21] = [
    "Success",
    "Unknown Command",
    "Not Connected",
    "Failed",
    "Connect Failed",
    "Authentication Failed",
    "Not Paired",
    "No Resources",
    "Timeout",
    "Already Connected",
    "Busy",
    "Rejected",
    "Not Supported",
    "Invalid Parameters",
    "Disconnected",
    "Not Powered",
    "Cancelled",
    "Invalid Index",
    "Blocked through rfkill",
    "Already Paired",
    "Permission Denied",
];

/// Human readable name of a management opcode
pub fn opcode_name(opcode: u16) -> &'static str {
    OPCODE_NAMES
        .get(opcode as usize)
        .copied()
        .unwrap_or("<unknown opcode>")
}

/// Human readable name of a management status
pub fn status_name(status: u8) -> &'static str {
    STATUS_NAMES
        .get(status as usize)
        .copied()
        .unwrap_or("<unknown status>")
}
