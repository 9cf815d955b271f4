use bitflags::bitflags;

bitflags! {
    /// Adapter-level activity of a channel
    ///
    /// The flags are independent; a channel can scan and pair at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ChannelState: u16 {
        const SCANNING = 0x0001;
        const PAIRING = 0x0002;
        const ADVERTISING = 0x4000;
        const ABORT = 0x8000;
    }
}

impl ChannelState {
    pub const IDLE: ChannelState = ChannelState::empty();

    pub fn is_idle(&self) -> bool {
        self.is_empty()
    }

    pub fn is_scanning(&self) -> bool {
        self.contains(ChannelState::SCANNING)
    }

    pub fn is_pairing(&self) -> bool {
        self.contains(ChannelState::PAIRING)
    }

    pub fn is_advertising(&self) -> bool {
        self.contains(ChannelState::ADVERTISING)
    }

    pub fn is_aborting(&self) -> bool {
        self.contains(ChannelState::ABORT)
    }

    /// Whether an abortable action (scan or pair) is running
    pub fn is_busy(&self) -> bool {
        self.intersects(ChannelState::SCANNING | ChannelState::PAIRING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_compose() {
        let state = ChannelState::SCANNING | ChannelState::PAIRING;
        assert!(state.is_scanning());
        assert!(state.is_pairing());
        assert!(!state.is_advertising());
        assert_eq!(state.bits(), 0x0003);
    }

    #[test]
    fn test_idle() {
        assert!(ChannelState::IDLE.is_idle());
        assert!(!ChannelState::IDLE.is_busy());
        assert_eq!(ChannelState::ADVERTISING.bits(), 1 << 14);
        assert_eq!(ChannelState::ABORT.bits(), 1 << 15);
        assert!(!ChannelState::ADVERTISING.is_busy());
    }
}
