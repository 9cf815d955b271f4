//! Example: Scanning for nearby devices
//!
//! Opens a channel on adapter 0, runs an LE discovery window and prints every
//! device that answers.
//!
//! Note: This example requires root privileges to run, as opening raw HCI sockets
//! requires elevated permissions.

use rustyhci::{Address, ChannelConfig, ChannelObserver, HciChannel};
use std::sync::Arc;
use std::time::Duration;

struct Printer;

impl ChannelObserver for Printer {
    fn discovered(&self, low_energy: bool, address: &Address, name: &str) {
        let transport = if low_energy { "LE" } else { "BR/EDR" };
        println!("{:<7} {}  {}", transport, address, name);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Opening channel on hci0...");
    let channel = HciChannel::open(ChannelConfig::default(), Arc::new(Printer))?;

    println!("Scanning for 10 seconds...");
    channel.scan(Some(Duration::from_secs(10)), false, false)?;

    channel.close();
    println!("Scan complete!");

    Ok(())
}
