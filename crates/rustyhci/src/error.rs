//! Error types for the rustyhci library
//!
//! This module defines the error type shared by the sockets, the exchanges and
//! the channel.

use thiserror::Error;

/// Errors that can occur when driving an HCI channel
#[derive(Error, Debug)]
pub enum HciError {
    #[error("Failed to open HCI socket: {0}")]
    SocketError(#[from] std::io::Error),

    #[error("Failed to bind to HCI device: {0}")]
    BindError(std::io::Error),

    #[error("Failed to send HCI frame: {0}")]
    SendError(std::io::Error),

    #[error("Failed to receive HCI frame: {0}")]
    ReceiveError(std::io::Error),

    #[error("Invalid parameter length: {0}")]
    InvalidParamLength(usize),

    #[error("Invalid HCI packet format")]
    InvalidPacketFormat,

    #[error("Invalid Bluetooth address: {0}")]
    InvalidAddress(String),

    #[error("Unsupported operation")]
    Unsupported,

    #[error("Timed out waiting for opcode {opcode:#06x}")]
    Timeout { opcode: u16 },

    #[error("Another exchange is already outstanding on this channel")]
    Busy,

    #[error("Channel is not open")]
    Closed,

    #[error("Operation not allowed in the current channel state")]
    IllegalState,

    #[error("Operation aborted")]
    Aborted,

    #[error("HCI command {opcode:#06x} failed with status {status:#04x}")]
    CommandFailed { opcode: u16, status: u8 },

    #[error("Management command {opcode:#06x} failed with status {status:#04x}")]
    ManagementFailed { opcode: u16, status: u8 },

    #[error("Unsupported management event {0:#06x}")]
    UnsupportedEvent(u16),

    #[error("Adapter control on hci{adapter} failed (errno {errno})")]
    AdapterControl { adapter: u16, errno: i32 },
}

impl HciError {
    /// True when the error came from the channel timing out an exchange
    pub fn is_timeout(&self) -> bool {
        matches!(self, HciError::Timeout { .. })
    }
}
