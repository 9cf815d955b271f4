//! Bluetooth management protocol
//!
//! Adapter configuration (power, pairing, advertising and friends) goes
//! through the kernel's management interface rather than raw HCI commands.

pub mod constants;
pub mod exchange;
pub mod socket;

#[cfg(test)]
mod tests;

pub use constants::{opcode_name, status_name};
pub use exchange::ManagementExchange;
pub use socket::ManagementSocket;
