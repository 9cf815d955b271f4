//! Bluetooth HCI (Host Controller Interface) implementation
//!
//! This module provides the HCI command exchanges, event framing and the raw
//! socket used to talk to an adapter.

pub mod command;
pub mod constants;
pub mod packet;
pub mod params;
pub mod socket;

#[cfg(test)]
mod tests;

pub use command::{CommandExchange, CommandKind, CommandParameters, Outcome};
pub use packet::{EventHeader, HciEvent};
pub use socket::{down, up, AdapterInfo, HciSocket};
