//! Management socket
//!
//! The management interface lives on the HCI control channel and is not bound
//! to any one adapter; commands carry the adapter index in their header.

use crate::error::HciError;
use crate::hci::socket::{open_bound, recv_on, send_on, HCI_CHANNEL_CONTROL, HCI_DEV_NONE};
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

/// Socket bound to the HCI control channel
#[derive(Debug)]
pub struct ManagementSocket {
    fd: AtomicI32,
}

impl ManagementSocket {
    pub fn open() -> Result<Self, HciError> {
        let fd = open_bound(HCI_DEV_NONE, HCI_CHANNEL_CONTROL)?;
        Ok(ManagementSocket {
            fd: AtomicI32::new(fd),
        })
    }

    /// Sends one management command (header included)
    pub fn send(&self, data: &[u8]) -> Result<usize, HciError> {
        send_on(self.as_raw_fd(), data)
    }

    /// Read a management event with a timeout
    pub fn recv_timeout(
        &self,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, HciError> {
        recv_on(self.as_raw_fd(), buffer, timeout)
    }

    pub fn close(&self) {
        let fd = self.fd.swap(-1, Ordering::SeqCst);
        if fd >= 0 {
            unsafe { libc::close(fd) };
        }
    }

    pub fn is_open(&self) -> bool {
        self.fd.load(Ordering::SeqCst) >= 0
    }
}

impl AsRawFd for ManagementSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.load(Ordering::SeqCst)
    }
}

impl Drop for ManagementSocket {
    fn drop(&mut self) {
        self.close();
    }
}
