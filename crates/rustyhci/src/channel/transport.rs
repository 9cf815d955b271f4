//! Byte transports underneath a channel
//!
//! A [`Transport`] is the write half: the channel pushes serialized exchanges
//! through it. Inbound bytes travel the other way, from whatever delivers them
//! into [`HciChannel::deserialize`] and [`HciChannel::deserialize_management`].
//! On Linux both halves are backed by a raw HCI socket and a management socket,
//! with a reader thread doing the delivery.

use crate::channel::{HciChannel, Inner};
use crate::error::HciError;
use crate::hci::constants::HCI_MAX_EVENT_SIZE;
use crate::hci::HciSocket;
use crate::mgmt::constants::{MGMT_HDR_SIZE, MGMT_MAX_PARAM_LEN};
use crate::mgmt::ManagementSocket;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Connection transitions reported by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    Suspended,
}

/// Outbound half of a channel's connection to the adapter
pub trait Transport: Send {
    /// Write a piece of an HCI command, returns the number of bytes taken
    fn send(&mut self, data: &[u8]) -> Result<usize, HciError>;

    /// Write a piece of a management command
    fn send_management(&mut self, _data: &[u8]) -> Result<usize, HciError> {
        Err(HciError::Unsupported)
    }

    /// Release the underlying resources; later calls are no-ops
    fn close(&mut self);
}

/// Raw HCI socket plus management socket for one adapter
#[derive(Debug)]
pub struct LinuxTransport {
    hci: Arc<HciSocket>,
    management: Arc<ManagementSocket>,
}

impl LinuxTransport {
    pub fn open(adapter: u16) -> Result<Self, HciError> {
        let hci = HciSocket::open(adapter)?;
        let management = ManagementSocket::open()?;

        Ok(LinuxTransport {
            hci: Arc::new(hci),
            management: Arc::new(management),
        })
    }

    /// Reader that delivers the sockets' inbound traffic
    pub(crate) fn reader(&self) -> Reader {
        Reader {
            hci: Arc::clone(&self.hci),
            management: Arc::clone(&self.management),
        }
    }
}

impl Transport for LinuxTransport {
    fn send(&mut self, data: &[u8]) -> Result<usize, HciError> {
        self.hci.send(data)
    }

    fn send_management(&mut self, data: &[u8]) -> Result<usize, HciError> {
        self.management.send(data)
    }

    fn close(&mut self) {
        self.hci.close();
        self.management.close();
    }
}

pub(crate) struct Reader {
    hci: Arc<HciSocket>,
    management: Arc<ManagementSocket>,
}

impl Reader {
    /// Start delivering inbound frames to `channel`
    ///
    /// The thread only keeps a weak reference; it stops once the channel is
    /// dropped or the sockets are closed.
    pub(crate) fn spawn(self, channel: &HciChannel) -> Result<JoinHandle<()>, HciError> {
        let weak = Arc::downgrade(&channel.inner);
        let name = format!("rustyhci-reader-{}", self.hci.dev_id());

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || self.run(weak))?;

        Ok(handle)
    }

    fn run(self, weak: Weak<Inner>) {
        let mut event = vec![0u8; HCI_MAX_EVENT_SIZE];
        let mut management = vec![0u8; MGMT_HDR_SIZE + MGMT_MAX_PARAM_LEN];

        loop {
            let Some(inner) = weak.upgrade() else {
                log::debug!("channel dropped, reader exiting");
                break;
            };
            let channel = HciChannel { inner };

            let received = self
                .hci
                .recv_timeout(&mut event, POLL_INTERVAL)
                .map(|read| {
                    if let Some(length) = read {
                        channel.deserialize(&event[..length]);
                    }
                })
                .and_then(|_| self.management.recv_timeout(&mut management, POLL_INTERVAL))
                .map(|read| {
                    if let Some(length) = read {
                        channel.deserialize_management(&management[..length]);
                    }
                });

            if let Err(error) = received {
                if self.hci.is_open() && self.management.is_open() {
                    log::error!("reader stopped: {}", error);
                }
                channel.state_change(TransportEvent::Closed);
                break;
            }
        }
    }
}
