//! Example: Sending a single HCI command
//!
//! Asks the controller for the size of its LE white list and prints the
//! decoded answer.

use rustyhci::hci::command::READ_WHITE_LIST_SIZE;
use rustyhci::hci::params::WhiteListSize;
use rustyhci::{ChannelConfig, CommandExchange, HciChannel, NullObserver};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let channel = HciChannel::open(ChannelConfig::default(), Arc::new(NullObserver))?;

    let exchange = channel.execute(CommandExchange::new(&READ_WHITE_LIST_SIZE))?;
    match WhiteListSize::parse(exchange.response()) {
        Some(answer) => println!("White list holds {} entries", answer.size),
        None => eprintln!("Controller sent a short answer: {:02x?}", exchange.response()),
    }

    channel.close();
    Ok(())
}
