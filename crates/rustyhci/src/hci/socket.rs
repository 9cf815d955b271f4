//! HCI Socket implementation for Bluetooth communication
//!
//! This module provides a wrapper around the raw HCI socket interface, plus
//! the device-control requests (adapter up/down, adapter info) the kernel
//! offers on the same socket family.

use crate::error::HciError;
use crate::hci::constants::*;
use std::os::unix::io::{AsRawFd, RawFd};
use std::sync::atomic::{AtomicI32, Ordering};
use std::time::Duration;

// Bluetooth socket constants
pub(crate) const AF_BLUETOOTH: i32 = 31;
pub(crate) const BTPROTO_HCI: i32 = 1;
pub(crate) const HCI_CHANNEL_RAW: u16 = 0;
pub(crate) const HCI_CHANNEL_CONTROL: u16 = 3;
pub(crate) const HCI_DEV_NONE: u16 = 0xFFFF;

const SOL_HCI: i32 = 0;
const HCI_FILTER: i32 = 2;

// Device control requests: _IOW('H', 201/202, int) and _IOR('H', 211, int)
const HCIDEVUP: u64 = 0x400448C9;
const HCIDEVDOWN: u64 = 0x400448CA;
const HCIGETDEVINFO: u64 = 0x800448D3;

const HCI_UP_FLAG: u32 = 1 << 0;
const HCI_MAX_DEV: u16 = 16;

// Define the sockaddr_hci structure
#[repr(C)]
struct SockaddrHci {
    hci_family: libc::sa_family_t,
    hci_dev: u16,
    hci_channel: u16,
}

#[repr(C)]
struct HciFilter {
    type_mask: u32,
    event_mask: [u32; 2],
    opcode: u16,
}

#[repr(C)]
#[allow(dead_code)]
struct HciDevInfo {
    dev_id: u16,
    name: [u8; 8],
    bdaddr: [u8; 6],
    flags: u32,
    type_: u8,
    features: [u8; 8],
    pkt_type: u32,
    link_policy: u32,
    link_mode: u32,
    acl_mtu: u16,
    acl_pkts: u16,
    sco_mtu: u16,
    sco_pkts: u16,
    stat: [u32; 10],
}

/// What the kernel reports about one adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    pub index: u16,
    pub name: String,
    pub bdaddr: [u8; 6],
    pub flags: u32,
}

impl AdapterInfo {
    pub fn is_up(&self) -> bool {
        self.flags & HCI_UP_FLAG != 0
    }
}

/// Open a Bluetooth HCI socket bound to `dev_id` on `channel`
pub(crate) fn open_bound(dev_id: u16, channel: u16) -> Result<RawFd, HciError> {
    let fd = unsafe {
        libc::socket(
            AF_BLUETOOTH,
            libc::SOCK_RAW | libc::SOCK_CLOEXEC,
            BTPROTO_HCI,
        )
    };

    if fd < 0 {
        return Err(HciError::SocketError(std::io::Error::last_os_error()));
    }

    let addr = SockaddrHci {
        hci_family: AF_BLUETOOTH as libc::sa_family_t,
        hci_dev: dev_id,
        hci_channel: channel,
    };

    let result = unsafe {
        libc::bind(
            fd,
            &addr as *const _ as *const libc::sockaddr,
            std::mem::size_of::<SockaddrHci>() as libc::socklen_t,
        )
    };

    if result < 0 {
        let error = std::io::Error::last_os_error();
        unsafe { libc::close(fd) };
        return Err(HciError::BindError(error));
    }

    Ok(fd)
}

/// Write one frame to a socket
pub(crate) fn send_on(fd: RawFd, data: &[u8]) -> Result<usize, HciError> {
    if fd < 0 {
        return Err(HciError::Closed);
    }

    match unsafe { libc::write(fd, data.as_ptr() as *const libc::c_void, data.len()) } {
        -1 => Err(HciError::SendError(std::io::Error::last_os_error())),
        written => Ok(written as usize),
    }
}

/// Wait up to `timeout` for a frame and read it into `buffer`
///
/// Returns `Ok(None)` when nothing arrived in time.
pub(crate) fn recv_on(
    fd: RawFd,
    buffer: &mut [u8],
    timeout: Duration,
) -> Result<Option<usize>, HciError> {
    if fd < 0 {
        return Err(HciError::Closed);
    }

    // Set up the fd_set for select()
    let mut read_fds: libc::fd_set = unsafe { std::mem::zeroed() };
    unsafe {
        libc::FD_ZERO(&mut read_fds);
        libc::FD_SET(fd, &mut read_fds);
    }

    let mut timeout_val = libc::timeval {
        tv_sec: timeout.as_secs() as libc::time_t,
        tv_usec: timeout.subsec_micros() as libc::suseconds_t,
    };

    let result = unsafe {
        libc::select(
            fd + 1,
            &mut read_fds,
            std::ptr::null_mut(),
            std::ptr::null_mut(),
            &mut timeout_val,
        )
    };

    if result < 0 {
        let error = std::io::Error::last_os_error();
        if error.kind() == std::io::ErrorKind::Interrupted {
            return Ok(None);
        }
        return Err(HciError::ReceiveError(error));
    }

    if result == 0 {
        return Ok(None);
    }

    let bytes_read =
        unsafe { libc::read(fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len()) };

    if bytes_read < 0 {
        return Err(HciError::ReceiveError(std::io::Error::last_os_error()));
    }

    Ok(Some(bytes_read as usize))
}

/// Represents an HCI socket bound to the raw channel of one adapter
#[derive(Debug)]
pub struct HciSocket {
    fd: AtomicI32,
    dev_id: u16,
}

impl HciSocket {
    /// Opens a new HCI socket
    ///
    /// # Arguments
    ///
    /// * `dev_id` - The device ID to open (0 for the first device)
    ///
    /// The socket only passes event packets, all event codes.
    pub fn open(dev_id: u16) -> Result<Self, HciError> {
        let fd = open_bound(dev_id, HCI_CHANNEL_RAW)?;
        let socket = HciSocket {
            fd: AtomicI32::new(fd),
            dev_id,
        };
        socket.set_filter()?;
        Ok(socket)
    }

    pub fn dev_id(&self) -> u16 {
        self.dev_id
    }

    fn set_filter(&self) -> Result<(), HciError> {
        let filter = HciFilter {
            type_mask: 1 << HCI_EVENT_PKT,
            event_mask: [u32::MAX, u32::MAX],
            opcode: 0,
        };

        let result = unsafe {
            libc::setsockopt(
                self.as_raw_fd(),
                SOL_HCI,
                HCI_FILTER,
                &filter as *const _ as *const libc::c_void,
                std::mem::size_of::<HciFilter>() as libc::socklen_t,
            )
        };

        if result < 0 {
            return Err(HciError::SocketError(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Sends a raw HCI packet (packet type tag included)
    pub fn send(&self, data: &[u8]) -> Result<usize, HciError> {
        send_on(self.as_raw_fd(), data)
    }

    /// Read an HCI frame with a timeout
    pub fn recv_timeout(
        &self,
        buffer: &mut [u8],
        timeout: Duration,
    ) -> Result<Option<usize>, HciError> {
        recv_on(self.as_raw_fd(), buffer, timeout)
    }

    /// Release the descriptor; later calls are no-ops
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

impl AsRawFd for HciSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.load(Ordering::SeqCst)
    }
}

impl Drop for HciSocket {
    fn drop(&mut self) {
        self.close();
    }
}

fn adapter_control(adapter: u16, request: u64, action: &str) -> Result<(), HciError> {
    let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_RAW | libc::SOCK_CLOEXEC, BTPROTO_HCI) };

    if fd < 0 {
        let error = std::io::Error::last_os_error();
        log::error!("Could not open a control socket: {}", error);
        return Err(HciError::SocketError(error));
    }

    let result = unsafe { libc::ioctl(fd, request as _, adapter as libc::c_int) };
    let error = std::io::Error::last_os_error();
    unsafe { libc::close(fd) };

    let errno = error.raw_os_error().unwrap_or(0);
    if result == 0 || errno == libc::EALREADY {
        return Ok(());
    }

    log::error!("Could not bring {} hci{}: errno {}", action, adapter, errno);
    Err(HciError::AdapterControl { adapter, errno })
}

/// Power the adapter interface up; an adapter that is already up counts as success
pub fn up(adapter: u16) -> Result<(), HciError> {
    adapter_control(adapter, HCIDEVUP, "up")
}

/// Take the adapter interface down; an adapter that is already down counts as success
pub fn down(adapter: u16) -> Result<(), HciError> {
    adapter_control(adapter, HCIDEVDOWN, "down")
}

/// Ask the kernel about one adapter
pub fn adapter_info(index: u16) -> Result<AdapterInfo, HciError> {
    let fd = unsafe { libc::socket(AF_BLUETOOTH, libc::SOCK_RAW | libc::SOCK_CLOEXEC, BTPROTO_HCI) };

    if fd < 0 {
        return Err(HciError::SocketError(std::io::Error::last_os_error()));
    }

    let mut info: HciDevInfo = unsafe { std::mem::zeroed() };
    info.dev_id = index;

    let result = unsafe { libc::ioctl(fd, HCIGETDEVINFO as _, &mut info as *mut HciDevInfo) };
    let error = std::io::Error::last_os_error();
    unsafe { libc::close(fd) };

    if result < 0 {
        return Err(HciError::SocketError(error));
    }

    let end = info.name.iter().position(|&b| b == 0).unwrap_or(info.name.len());

    Ok(AdapterInfo {
        index,
        name: String::from_utf8_lossy(&info.name[..end]).into_owned(),
        bdaddr: info.bdaddr,
        flags: info.flags,
    })
}

/// Index of the first adapter that is up
pub fn first_adapter() -> Option<u16> {
    (0..HCI_MAX_DEV).find(|&index| {
        adapter_info(index)
            .map(|info| info.is_up())
            .unwrap_or(false)
    })
}
