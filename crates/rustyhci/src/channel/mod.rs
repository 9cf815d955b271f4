//! HCI channel
//!
//! An [`HciChannel`] owns the transport to one adapter, correlates inbound
//! frames with the outstanding command and management exchanges, hands
//! everything else to a [`ChannelObserver`], and runs the adapter-level
//! operations (scan, advertise, pair, configure) on top of that.
//!
//! The channel publishes a [`ChannelState`] that any thread can wait on.
//! Waiters are woken on every change; [`HciChannel::abort`] releases them all
//! regardless of what they wait for.

mod config;
mod state;
mod transport;


pub use config::ChannelConfig;
pub use state::ChannelState;
pub use transport::{LinuxTransport, Transport, TransportEvent};

use crate::error::HciError;
use crate::gap::{Address, AddressType, IoCapability, PUBLIC_DEVICE_ADDRESS};
use crate::hci::command::{CommandExchange, Outcome, INQUIRY_CANCEL};
use crate::hci::constants::HCI_EVENT_PKT;
use crate::hci::params::{
    Inquiry, LeSetAdvertisingEnable, LeSetAdvertisingParameters, LeSetScanEnable,
    LeSetScanParameters,
};
use crate::hci::HciEvent;
use crate::mgmt::constants::{MGMT_HDR_SIZE, MGMT_STATUS_FAILED, MGMT_STATUS_SUCCESS};
use crate::mgmt::{opcode_name, status_name, ManagementExchange};
use crate::scan::{discovered_devices, is_discovery_event};
use byteorder::{ByteOrder, LittleEndian};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// Inquiry length unit
const INQUIRY_SLOT: Duration = Duration::from_millis(1280);
const INQUIRY_MAX_LENGTH: u8 = 0x30;

const ADVERTISING_CHANNEL_MAP: u8 = 0x07;

/// Hooks for everything the channel does not consume itself
pub trait ChannelObserver: Send + Sync {
    /// A device answered while the channel was scanning
    fn discovered(&self, _low_energy: bool, _address: &Address, _name: &str) {}

    /// An event no outstanding exchange claimed
    fn update(&self, _event: &HciEvent) {}

    /// A management event that is not the answer to an outstanding command,
    /// such as Device Connected or New Settings
    fn management(&self, _event: u16, _index: u16, _parameters: &[u8]) {}
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl ChannelObserver for NullObserver {}

/// How a [`HciChannel::wait_for`] ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitResult {
    Satisfied(ChannelState),
    Aborted(ChannelState),
    TimedOut(ChannelState),
    Closed,
}

/// Result of one management toggle issued by [`HciChannel::config`]
#[derive(Debug)]
pub struct ConfigToggle {
    pub opcode: u16,
    pub enabled: bool,
    pub result: Result<(), HciError>,
}

impl ConfigToggle {
    pub fn name(&self) -> &'static str {
        opcode_name(self.opcode)
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-toggle outcome of [`HciChannel::config`]
#[derive(Debug, Default)]
pub struct ConfigReport {
    pub toggles: Vec<ConfigToggle>,
}

impl ConfigReport {
    pub fn success(&self) -> bool {
        self.toggles.iter().all(ConfigToggle::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &ConfigToggle> {
        self.toggles.iter().filter(|toggle| !toggle.succeeded())
    }
}

/// The two kinds of exchange a channel can carry
///
/// Each travels on its own stream and has its own outstanding slot.
trait Exchange: Sized {
    fn rewind(&mut self);
    fn next_chunk(&mut self, stream: &mut [u8]) -> usize;
    fn finished(&self) -> bool;
    fn code(&self) -> u16;
    fn write(transport: &mut dyn Transport, data: &[u8]) -> Result<usize, HciError>;
    fn slot(shared: &mut Shared) -> &mut Option<Self>;
}

impl Exchange for CommandExchange {
    fn rewind(&mut self) {
        self.reload();
    }

    fn next_chunk(&mut self, stream: &mut [u8]) -> usize {
        self.serialize(stream)
    }

    fn finished(&self) -> bool {
        self.is_completed()
    }

    fn code(&self) -> u16 {
        self.opcode()
    }

    fn write(transport: &mut dyn Transport, data: &[u8]) -> Result<usize, HciError> {
        transport.send(data)
    }

    fn slot(shared: &mut Shared) -> &mut Option<Self> {
        &mut shared.command
    }
}

impl Exchange for ManagementExchange {
    fn rewind(&mut self) {
        self.reload();
    }

    fn next_chunk(&mut self, stream: &mut [u8]) -> usize {
        self.serialize(stream)
    }

    fn finished(&self) -> bool {
        self.is_completed()
    }

    fn code(&self) -> u16 {
        self.opcode()
    }

    fn write(transport: &mut dyn Transport, data: &[u8]) -> Result<usize, HciError> {
        transport.send_management(data)
    }

    fn slot(shared: &mut Shared) -> &mut Option<Self> {
        &mut shared.management
    }
}

struct Shared {
    state: ChannelState,
    ready: bool,
    // Bumped by every abort; waits compare it with the value they started on
    aborts: u64,
    command: Option<CommandExchange>,
    management: Option<ManagementExchange>,
}

struct Inner {
    config: ChannelConfig,
    shared: Mutex<Shared>,
    changed: Condvar,
    transport: Mutex<Option<Box<dyn Transport>>>,
    observer: Arc<dyn ChannelObserver>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        let transport = self
            .transport
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(mut transport) = transport.take() {
            transport.close();
        }
    }
}

/// Handle to a channel; clones share the same channel
#[derive(Clone)]
pub struct HciChannel {
    inner: Arc<Inner>,
}

impl HciChannel {
    /// Wrap an already connected transport
    ///
    /// The channel starts out not ready; the transport reports
    /// [`TransportEvent::Opened`] through [`state_change`](Self::state_change).
    pub fn new(
        config: ChannelConfig,
        transport: Box<dyn Transport>,
        observer: Arc<dyn ChannelObserver>,
    ) -> Self {
        HciChannel {
            inner: Arc::new(Inner {
                config,
                shared: Mutex::new(Shared {
                    state: ChannelState::IDLE,
                    ready: false,
                    aborts: 0,
                    command: None,
                    management: None,
                }),
                changed: Condvar::new(),
                transport: Mutex::new(Some(transport)),
                observer,
            }),
        }
    }

    /// Open the raw and management sockets for `config.adapter` and start
    /// delivering their traffic
    pub fn open(
        config: ChannelConfig,
        observer: Arc<dyn ChannelObserver>,
    ) -> Result<HciChannel, HciError> {
        let transport = LinuxTransport::open(config.adapter)?;
        let reader = transport.reader();
        let adapter = config.adapter;
        let channel = HciChannel::new(config, Box::new(transport), observer);

        reader.spawn(&channel)?;
        channel.state_change(TransportEvent::Opened);
        log::info!("channel on hci{} open", adapter);
        Ok(channel)
    }

    pub fn channel_config(&self) -> &ChannelConfig {
        &self.inner.config
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.inner
            .shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn transport(&self) -> MutexGuard<'_, Option<Box<dyn Transport>>> {
        self.inner
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ChannelState {
        self.shared().state
    }

    pub fn is_ready(&self) -> bool {
        self.shared().ready
    }

    pub fn is_scanning(&self) -> bool {
        self.state().is_scanning()
    }

    pub fn is_pairing(&self) -> bool {
        self.state().is_pairing()
    }

    pub fn is_advertising(&self) -> bool {
        self.state().is_advertising()
    }

    pub fn is_aborting(&self) -> bool {
        self.state().is_aborting()
    }

    /// Block until `predicate` holds for the state, the channel is aborted
    /// or closed, or `timeout` passes
    pub fn wait_for<P>(&self, timeout: Duration, predicate: P) -> WaitResult
    where
        P: Fn(ChannelState) -> bool,
    {
        let guard = self.shared();
        let generation = guard.aborts;
        let (guard, _) = self
            .inner
            .changed
            .wait_timeout_while(guard, timeout, |shared| {
                shared.ready
                    && shared.aborts == generation
                    && !shared.state.is_aborting()
                    && !predicate(shared.state)
            })
            .unwrap_or_else(PoisonError::into_inner);

        if predicate(guard.state) {
            WaitResult::Satisfied(guard.state)
        } else if guard.state.is_aborting() || guard.aborts != generation {
            WaitResult::Aborted(guard.state)
        } else if !guard.ready {
            WaitResult::Closed
        } else {
            WaitResult::TimedOut(guard.state)
        }
    }

    /// Transport connection transitions
    ///
    /// Losing the transport clears every flag, drops the outstanding exchanges
    /// and wakes all waiters.
    pub fn state_change(&self, event: TransportEvent) {
        let mut shared = self.shared();
        match event {
            TransportEvent::Opened => {
                shared.ready = true;
            }
            TransportEvent::Closed | TransportEvent::Suspended => {
                if shared.ready {
                    log::info!("channel {:?}", event);
                }
                shared.ready = false;
                shared.state = ChannelState::IDLE;
                shared.command = None;
                shared.management = None;
            }
        }
        self.inner.changed.notify_all();
    }

    /// Inbound entry point for the HCI stream (packet type tag included)
    ///
    /// Returns the number of bytes consumed, zero for frames that are not
    /// well-formed events.
    pub fn deserialize(&self, frame: &[u8]) -> usize {
        if frame.first() != Some(&HCI_EVENT_PKT) {
            log::trace!("dropping non-event frame of {} bytes", frame.len());
            return 0;
        }

        let Some(event) = HciEvent::parse(&frame[1..]) else {
            log::trace!("dropping short event frame of {} bytes", frame.len());
            return 0;
        };

        let scanning = {
            let mut shared = self.shared();
            if let Some(exchange) = shared.command.as_mut() {
                if !exchange.is_completed() {
                    let consumed = exchange.deserialize(frame);
                    if consumed > 0 {
                        if exchange.is_completed() {
                            self.inner.changed.notify_all();
                        }
                        return consumed;
                    }
                }
            }
            shared.state.is_scanning()
        };

        if scanning && is_discovery_event(&event) {
            for device in discovered_devices(&event) {
                self.inner
                    .observer
                    .discovered(device.low_energy, &device.address, &device.name);
            }
        }
        self.inner.observer.update(&event);

        frame.len()
    }

    /// Inbound entry point for the management stream
    ///
    /// Answers to the outstanding management command go to its exchange;
    /// any other complete event goes to the observer. Returns the number of
    /// bytes consumed, zero for data too short to carry an event header.
    pub fn deserialize_management(&self, data: &[u8]) -> usize {
        {
            let mut shared = self.shared();
            if let Some(exchange) = shared.management.as_mut() {
                if exchange.answers(data) {
                    let consumed = exchange.deserialize(data);
                    if exchange.is_completed() {
                        self.inner.changed.notify_all();
                    }
                    if consumed > 0 {
                        return consumed;
                    }
                }
            }
        }

        if data.len() < MGMT_HDR_SIZE {
            log::trace!("dropping {} bytes of management data", data.len());
            return 0;
        }

        let event = LittleEndian::read_u16(&data[0..2]);
        let index = LittleEndian::read_u16(&data[2..4]);
        let length = LittleEndian::read_u16(&data[4..6]) as usize;
        let end = data.len().min(MGMT_HDR_SIZE + length);
        log::trace!("management event {:#06x} on index {}", event, index);

        self.inner
            .observer
            .management(event, index, &data[MGMT_HDR_SIZE..end]);
        end
    }

    /// Send a command and wait up to the configured timeout for it to complete
    ///
    /// The exchange comes back completed; a failure status is not an error at
    /// this level, see [`CommandExchange::outcome`].
    pub fn execute(&self, exchange: CommandExchange) -> Result<CommandExchange, HciError> {
        self.execute_timeout(exchange, self.inner.config.command_timeout)
    }

    pub fn execute_timeout(
        &self,
        exchange: CommandExchange,
        timeout: Duration,
    ) -> Result<CommandExchange, HciError> {
        self.submit(exchange, timeout)
    }

    /// Send a management command and wait up to the configured timeout for the answer
    pub fn manage(&self, exchange: ManagementExchange) -> Result<ManagementExchange, HciError> {
        self.manage_timeout(exchange, self.inner.config.command_timeout)
    }

    pub fn manage_timeout(
        &self,
        exchange: ManagementExchange,
        timeout: Duration,
    ) -> Result<ManagementExchange, HciError> {
        self.submit(exchange, timeout)
    }

    fn submit<E: Exchange>(&self, mut exchange: E, timeout: Duration) -> Result<E, HciError> {
        exchange.rewind();

        let mut chunks = Vec::new();
        let mut buffer = vec![0u8; self.inner.config.frame_size.max(1)];
        loop {
            let count = exchange.next_chunk(&mut buffer);
            if count == 0 {
                break;
            }
            chunks.push(buffer[..count].to_vec());
        }

        let generation = {
            let mut shared = self.shared();
            if !shared.ready {
                return Err(HciError::Closed);
            }
            let slot = E::slot(&mut shared);
            if slot.is_some() {
                return Err(HciError::Busy);
            }
            *slot = Some(exchange);
            shared.aborts
        };

        if let Err(error) = self.write_chunks::<E>(&chunks) {
            E::slot(&mut self.shared()).take();
            return Err(error);
        }

        let guard = self.shared();
        let (mut guard, _) = self
            .inner
            .changed
            .wait_timeout_while(guard, timeout, |shared| {
                shared.ready
                    && shared.aborts == generation
                    && E::slot(shared)
                        .as_ref()
                        .map(|exchange| !exchange.finished())
                        .unwrap_or(false)
            })
            .unwrap_or_else(PoisonError::into_inner);

        let outstanding = E::slot(&mut guard).take();
        if !guard.ready {
            return Err(HciError::Closed);
        }

        match outstanding {
            Some(exchange) if exchange.finished() => Ok(exchange),
            Some(exchange) if guard.aborts != generation => {
                log::debug!("opcode {:#06x} abandoned on abort", exchange.code());
                Err(HciError::Aborted)
            }
            Some(exchange) => {
                let opcode = exchange.code();
                log::warn!("no answer for opcode {:#06x} within {:?}", opcode, timeout);
                Err(HciError::Timeout { opcode })
            }
            None => Err(HciError::Closed),
        }
    }

    fn write_chunks<E: Exchange>(&self, chunks: &[Vec<u8>]) -> Result<(), HciError> {
        let mut guard = self.transport();
        let transport = guard.as_mut().ok_or(HciError::Closed)?;

        for chunk in chunks {
            let mut written = 0;
            while written < chunk.len() {
                let count = E::write(transport.as_mut(), &chunk[written..])?;
                if count == 0 {
                    return Err(HciError::SendError(std::io::Error::from(
                        std::io::ErrorKind::WriteZero,
                    )));
                }
                written += count;
            }
        }
        Ok(())
    }

    /// Execute a command and turn a failed outcome into an error
    fn command(&self, exchange: CommandExchange) -> Result<CommandExchange, HciError> {
        let exchange = self.execute(exchange)?;
        let opcode = exchange.opcode();

        let status = match exchange.outcome() {
            Some(Outcome::Success) => exchange.return_status().unwrap_or(0),
            Some(Outcome::Status(status)) => status,
            _ => {
                log::warn!("{}: malformed completion", exchange.kind().name);
                return Err(HciError::InvalidPacketFormat);
            }
        };

        if status != 0 {
            log::warn!("{} failed with status {:#04x}", exchange.kind().name, status);
            return Err(HciError::CommandFailed { opcode, status });
        }
        Ok(exchange)
    }

    /// Run a management command and turn anything but success into an error
    fn management(&self, exchange: ManagementExchange, timeout: Duration) -> Result<(), HciError> {
        let exchange = self.manage_timeout(exchange, timeout)?;

        if exchange.success() {
            return Ok(());
        }
        if let Some(event) = exchange.unsupported_event() {
            return Err(HciError::UnsupportedEvent(event));
        }

        let status = match exchange.status() {
            Some(MGMT_STATUS_SUCCESS) | None => MGMT_STATUS_FAILED,
            Some(status) => status,
        };
        Err(HciError::ManagementFailed {
            opcode: exchange.opcode(),
            status,
        })
    }

    /// Raise `flag` unless it is already set
    ///
    /// Flags are raised here, on the calling thread, so the state shows the
    /// operation before any of its traffic goes out.
    fn begin(&self, flag: ChannelState) -> Result<(), HciError> {
        let mut shared = self.shared();
        if !shared.ready {
            return Err(HciError::Closed);
        }
        if shared.state.contains(flag) {
            return Err(HciError::IllegalState);
        }
        if shared.state.is_aborting() {
            return Err(HciError::Aborted);
        }
        shared.state.insert(flag);
        self.inner.changed.notify_all();
        Ok(())
    }

    /// Drop `flag`; the abort request goes with the last running action
    fn end(&self, flag: ChannelState) {
        let mut shared = self.shared();
        shared.state.remove(flag);
        if !shared.state.is_busy() {
            shared.state.remove(ChannelState::ABORT);
        }
        self.inner.changed.notify_all();
    }

    /// Collect discovery results once a scan was started
    ///
    /// Clears SCANNING after the window or an abort. An abort while the scan
    /// was still starting counts as an abort, not a failure.
    fn discover(
        &self,
        window: Option<Duration>,
        started: Result<CommandExchange, HciError>,
    ) -> Result<(), HciError> {
        match started {
            Ok(_) | Err(HciError::Aborted) => {}
            Err(error) => {
                self.end(ChannelState::SCANNING);
                return Err(error);
            }
        }

        let window = window.unwrap_or(self.inner.config.scan_window);
        let waited = self.wait_for(window, |_| false);
        self.end(ChannelState::SCANNING);

        if waited == WaitResult::Closed {
            return Err(HciError::Closed);
        }
        Ok(())
    }

    /// Run an LE scan for `window`, or the configured scan window if `None`
    ///
    /// Discovered devices go to the observer. Returns once the window passed
    /// or the scan was aborted.
    pub fn scan(
        &self,
        window: Option<Duration>,
        limited: bool,
        passive: bool,
    ) -> Result<(), HciError> {
        let config = &self.inner.config;
        let interval = if limited {
            config.limited_scan_interval
        } else {
            config.scan_interval
        };

        let parameters = CommandExchange::with_parameters(&LeSetScanParameters {
            scan_type: if passive { 0x00 } else { 0x01 },
            interval,
            window: interval,
            own_address_type: PUBLIC_DEVICE_ADDRESS,
            filter_policy: 0x00,
        })?;
        let enable = CommandExchange::with_parameters(&LeSetScanEnable {
            enable: true,
            filter_duplicates: config.filter_duplicates,
        })?;
        let disable = CommandExchange::with_parameters(&LeSetScanEnable {
            enable: false,
            filter_duplicates: false,
        })?;

        self.begin(ChannelState::SCANNING)?;
        let started = self
            .command(parameters)
            .and_then(|_| self.command(enable));
        self.discover(window, started)?;

        self.command(disable).map(|_| ())
    }

    /// Run a classic inquiry for `window`, or the configured scan window if
    /// `None`
    ///
    /// `lap` selects the inquiry access code, see
    /// [`GIAC_LAP`](crate::gap::GIAC_LAP). A `max_responses` of zero means
    /// unlimited.
    pub fn scan_inquiry(
        &self,
        window: Option<Duration>,
        lap: u32,
        max_responses: u8,
    ) -> Result<(), HciError> {
        let span = window.unwrap_or(self.inner.config.scan_window);
        let slots = span.as_millis().div_ceil(INQUIRY_SLOT.as_millis());
        let length = slots.clamp(1, INQUIRY_MAX_LENGTH as u128) as u8;

        let inquiry = CommandExchange::with_parameters(&Inquiry {
            lap,
            length,
            num_responses: max_responses,
        })?;

        self.begin(ChannelState::SCANNING)?;
        let started = self.command(inquiry);
        self.discover(Some(span), started)?;

        self.command(CommandExchange::new(&INQUIRY_CANCEL)).map(|_| ())
    }

    /// Start or stop LE advertising
    ///
    /// `mode` is the advertising type (0x00 connectable undirected, 0x02
    /// scannable, 0x03 non-connectable).
    pub fn advertising(&self, enable: bool, mode: u8) -> Result<(), HciError> {
        if !enable {
            if !self.is_advertising() {
                return Err(HciError::IllegalState);
            }
            let stopped = CommandExchange::with_parameters(&LeSetAdvertisingEnable {
                enable: false,
            })
            .and_then(|exchange| self.command(exchange));
            self.end(ChannelState::ADVERTISING);
            return stopped.map(|_| ());
        }

        let interval = self.inner.config.advertising_interval;
        let parameters = CommandExchange::with_parameters(&LeSetAdvertisingParameters {
            min_interval: interval,
            max_interval: interval,
            advertising_type: mode,
            own_address_type: PUBLIC_DEVICE_ADDRESS,
            direct_address_type: PUBLIC_DEVICE_ADDRESS,
            direct_address: Address::any(),
            channel_map: ADVERTISING_CHANNEL_MAP,
            filter_policy: 0x00,
        })?;
        let start = CommandExchange::with_parameters(&LeSetAdvertisingEnable { enable: true })?;

        self.begin(ChannelState::ADVERTISING)?;
        let started = self
            .command(parameters)
            .and_then(|_| self.command(start));

        if started.is_err() {
            self.end(ChannelState::ADVERTISING);
        }
        started.map(|_| ())
    }

    /// Pair with `remote`, waiting up to the configured pairing timeout
    ///
    /// An abort cancels the pairing with the adapter before returning
    /// [`HciError::Aborted`].
    pub fn pair(
        &self,
        remote: &Address,
        address_type: AddressType,
        capability: IoCapability,
    ) -> Result<(), HciError> {
        let adapter = self.inner.config.adapter;
        let exchange = ManagementExchange::pair_device(adapter, remote, address_type, capability)?;
        let cancel = ManagementExchange::cancel_pair_device(adapter, remote, address_type)?;

        self.begin(ChannelState::PAIRING)?;
        let result = self.management(exchange, self.inner.config.pair_timeout);

        if let Err(HciError::Aborted) = result {
            if let Err(error) = self.management(cancel, self.inner.config.command_timeout) {
                log::warn!("cancelling pairing with {} failed: {}", remote, error);
            }
        }

        self.end(ChannelState::PAIRING);
        result
    }

    /// Remove the pairing with `remote` and drop any link to it
    pub fn unpair(&self, remote: &Address, address_type: AddressType) -> Result<(), HciError> {
        let adapter = self.inner.config.adapter;
        let exchange = ManagementExchange::unpair_device(adapter, remote, address_type, true)?;

        self.begin(ChannelState::PAIRING)?;
        let result = self.management(exchange, self.inner.config.pair_timeout);

        self.end(ChannelState::PAIRING);
        result
    }

    /// Release every blocking wait on the channel
    ///
    /// State waiters return [`WaitResult::Aborted`] and outstanding exchanges
    /// fail with [`HciError::Aborted`]. Running scans and pairings keep seeing
    /// ABORT until the last of them has wound down.
    ///
    /// Returns whether a scan or pairing was running.
    pub fn abort(&self) -> bool {
        let mut shared = self.shared();
        shared.aborts = shared.aborts.wrapping_add(1);

        let running = shared.state.is_busy();
        if running {
            shared.state.insert(ChannelState::ABORT);
        }
        self.inner.changed.notify_all();
        running
    }

    /// Apply the adapter settings one management command at a time
    ///
    /// A failing toggle does not stop the ones after it.
    pub fn config(
        &self,
        powered: bool,
        bondable: bool,
        advertising: bool,
        simple_pairing: bool,
        low_energy: bool,
        secure: bool,
    ) -> ConfigReport {
        let adapter = self.inner.config.adapter;
        let timeout = self.inner.config.command_timeout;

        let toggles = [
            ManagementExchange::set_powered(adapter, powered),
            ManagementExchange::set_bondable(adapter, bondable),
            ManagementExchange::set_advertising(adapter, advertising),
            ManagementExchange::set_simple_pairing(adapter, simple_pairing),
            ManagementExchange::set_low_energy(adapter, low_energy),
            ManagementExchange::set_secure_connections(adapter, secure),
        ];
        let settings = [
            powered,
            bondable,
            advertising,
            simple_pairing,
            low_energy,
            secure,
        ];

        let mut report = ConfigReport::default();
        for (exchange, enabled) in toggles.into_iter().zip(settings) {
            let opcode = exchange.opcode();
            let result = self.management(exchange, timeout);

            if let Err(error) = &result {
                match error {
                    HciError::ManagementFailed { status, .. } => log::warn!(
                        "{} ({}) failed: {}",
                        opcode_name(opcode),
                        enabled,
                        status_name(*status)
                    ),
                    _ => log::warn!("{} ({}) failed: {}", opcode_name(opcode), enabled, error),
                }
            }

            report.toggles.push(ConfigToggle {
                opcode,
                enabled,
                result,
            });
        }
        report
    }

    /// Release the transport and mark the channel closed
    ///
    /// Closing twice is harmless.
    pub fn close(&self) {
        if let Some(mut transport) = self.transport().take() {
            transport.close();
        }
        self.state_change(TransportEvent::Closed);
    }
}
