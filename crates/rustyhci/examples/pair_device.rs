//! Example: Configuring the adapter and pairing with a device
//!
//! Usage: pair_device <address> [le]

use rustyhci::{Address, AddressType, ChannelConfig, HciChannel, IoCapability, NullObserver};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(address) = args.next() else {
        eprintln!("usage: pair_device <address> [le]");
        return Ok(());
    };
    let address: Address = address.parse()?;
    let address_type = match args.next().as_deref() {
        Some("le") => AddressType::LePublic,
        _ => AddressType::BrEdr,
    };

    let channel = HciChannel::open(ChannelConfig::default(), Arc::new(NullObserver))?;

    let report = channel.config(true, true, false, true, true, false);
    for toggle in report.failures() {
        eprintln!("{} could not be applied", toggle.name());
    }

    match channel.pair(&address, address_type, IoCapability::NoInputNoOutput) {
        Ok(()) => println!("Paired with {}", address),
        Err(e) => eprintln!("Pairing with {} failed: {}", address, e),
    }

    channel.close();
    Ok(())
}
