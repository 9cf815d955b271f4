use std::time::Duration;

/// Tunables of an [`HciChannel`](super::HciChannel)
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Adapter index the channel binds to
    pub adapter: u16,
    /// How long to wait for a single exchange to complete
    pub command_timeout: Duration,
    /// Default discovery window
    pub scan_window: Duration,
    /// How long to wait for a pairing answer
    pub pair_timeout: Duration,
    /// Largest chunk written to the transport at once
    pub frame_size: usize,
    /// LE scan interval and window, in 0.625 ms slots
    pub scan_interval: u16,
    /// LE scan interval and window for limited discovery, in 0.625 ms slots
    pub limited_scan_interval: u16,
    /// LE advertising interval, in 0.625 ms slots
    pub advertising_interval: u16,
    pub filter_duplicates: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            adapter: 0,
            command_timeout: Duration::from_millis(2000),
            scan_window: Duration::from_millis(1000),
            pair_timeout: Duration::from_millis(2000),
            frame_size: 256,
            scan_interval: 0x0010,
            limited_scan_interval: 0x0012,
            advertising_interval: 0x0800,
            filter_duplicates: true,
        }
    }
}
