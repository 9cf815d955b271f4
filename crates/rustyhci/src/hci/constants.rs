//! HCI protocol constants
//!
//! This module contains constants used in the Bluetooth HCI protocol.

// HCI packet types
pub const HCI_COMMAND_PKT: u8 = 0x01;
pub const HCI_ACL_PKT: u8 = 0x02;
pub const HCI_SCO_PKT: u8 = 0x03;
pub const HCI_EVENT_PKT: u8 = 0x04;
pub const HCI_ISO_PKT: u8 = 0x05;

// Maximum size of HCI command parameters
pub const HCI_MAX_PARAM_LEN: usize = 255;

// Packet tag + opcode + parameter length
pub const HCI_COMMAND_HDR_SIZE: usize = 4;
// Event code + parameter length
pub const HCI_EVENT_HDR_SIZE: usize = 2;
// Largest event frame including its packet tag
pub const HCI_MAX_EVENT_SIZE: usize = 1 + HCI_EVENT_HDR_SIZE + HCI_MAX_PARAM_LEN;

// Common OGF (Opcode Group Field) values
pub const OGF_LINK_CTL: u8 = 0x01;
pub const OGF_LINK_POLICY: u8 = 0x02;
pub const OGF_HOST_CTL: u8 = 0x03;
pub const OGF_INFO_PARAM: u8 = 0x04;
pub const OGF_STATUS_PARAM: u8 = 0x05;
pub const OGF_LE: u8 = 0x08;

// Link Control Commands (OGF: 0x01)
pub const OCF_INQUIRY: u16 = 0x0001;
pub const OCF_INQUIRY_CANCEL: u16 = 0x0002;
pub const OCF_CREATE_CONNECTION: u16 = 0x0005;
pub const OCF_DISCONNECT: u16 = 0x0006;
pub const OCF_AUTH_REQUESTED: u16 = 0x0011;
pub const OCF_REMOTE_NAME_REQ: u16 = 0x0019;

// LE Command OCF values (OGF: 0x08)
pub const OCF_LE_SET_ADVERTISING_PARAMETERS: u16 = 0x0006;
pub const OCF_LE_SET_ADVERTISING_ENABLE: u16 = 0x000A;
pub const OCF_LE_SET_SCAN_PARAMETERS: u16 = 0x000B;
pub const OCF_LE_SET_SCAN_ENABLE: u16 = 0x000C;
pub const OCF_LE_CREATE_CONNECTION: u16 = 0x000D;
pub const OCF_LE_READ_WHITE_LIST_SIZE: u16 = 0x000F;
pub const OCF_LE_CLEAR_WHITE_LIST: u16 = 0x0010;
pub const OCF_LE_ADD_DEVICE_TO_WHITE_LIST: u16 = 0x0011;
pub const OCF_LE_REMOVE_DEVICE_FROM_WHITE_LIST: u16 = 0x0012;
pub const OCF_LE_READ_REMOTE_USED_FEATURES: u16 = 0x0016;
pub const OCF_LE_START_ENCRYPTION: u16 = 0x0019;

// HCI Events
pub const EVT_INQUIRY_COMPLETE: u8 = 0x01;
pub const EVT_INQUIRY_RESULT: u8 = 0x02;
pub const EVT_CONN_COMPLETE: u8 = 0x03;
pub const EVT_DISCONN_COMPLETE: u8 = 0x05;
pub const EVT_AUTH_COMPLETE: u8 = 0x06;
pub const EVT_REMOTE_NAME_REQ_COMPLETE: u8 = 0x07;
pub const EVT_ENCRYPTION_CHANGE: u8 = 0x08;
pub const EVT_CMD_COMPLETE: u8 = 0x0E;
pub const EVT_CMD_STATUS: u8 = 0x0F;
pub const EVT_INQUIRY_RESULT_WITH_RSSI: u8 = 0x22;
pub const EVT_EXTENDED_INQUIRY_RESULT: u8 = 0x2F;
pub const EVT_LE_META_EVENT: u8 = 0x3E;

// Sizes of the fixed event headers
pub const EVT_CMD_STATUS_SIZE: usize = 4;
pub const EVT_CMD_COMPLETE_SIZE: usize = 3;
pub const EVT_LE_META_EVENT_SIZE: usize = 1;

// LE Meta Events
pub const EVT_LE_CONN_COMPLETE: u8 = 0x01;
pub const EVT_LE_ADVERTISING_REPORT: u8 = 0x02;
pub const EVT_LE_CONN_UPDATE_COMPLETE: u8 = 0x03;
pub const EVT_LE_READ_REMOTE_USED_FEATURES_COMPLETE: u8 = 0x04;

// Status codes
pub const HCI_SUCCESS: u8 = 0x00;
pub const HCI_UNSPECIFIED_ERROR: u8 = 0x1F;
