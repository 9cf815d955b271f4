//! Remote feature bitmap
//!
//! LE controllers report their link-layer features as a 64 bit little endian
//! mask. [`FeatureIterator`] walks the set bits of such a mask.

const FEATURE_BYTES: usize = 8;
const FEATURE_BITS: i16 = (FEATURE_BYTES * 8) as i16;

/// Names of the LE link-layer features, indexed by bit number
const LE_FEATURE_NAMES: [&str; 40] = [
    "LE Encryption",
    "Connection Parameters Request Procedure",
    "Extended Reject Indication",
    "Peripheral-initiated Features Exchange",
    "LE Ping",
    "LE Data Packet Length Extension",
    "LL Privacy",
    "Extended Scanner Filter Policies",
    "LE 2M PHY",
    "Stable Modulation Index - Transmitter",
    "Stable Modulation Index - Receiver",
    "LE Coded PHY",
    "LE Extended Advertising",
    "LE Periodic Advertising",
    "Channel Selection Algorithm #2",
    "LE Power Class 1",
    "Minimum Number of Used Channels Procedure",
    "Connection CTE Request",
    "Connection CTE Response",
    "Connectionless CTE Transmitter",
    "Connectionless CTE Receiver",
    "Antenna Switching During CTE Transmission (AoD)",
    "Antenna Switching During CTE Reception (AoA)",
    "Receiving Constant Tone Extensions",
    "Periodic Advertising Sync Transfer - Sender",
    "Periodic Advertising Sync Transfer - Recipient",
    "Sleep Clock Accuracy Updates",
    "Remote Public Key Validation",
    "Connected Isochronous Stream - Central",
    "Connected Isochronous Stream - Peripheral",
    "Isochronous Broadcaster",
    "Synchronized Receiver",
    "Connected Isochronous Stream (Host Support)",
    "LE Power Control Request",
    "LE Power Control Request",
    "LE Path Loss Monitoring",
    "Periodic Advertising ADI support",
    "Connection Subrating",
    "Connection Subrating (Host Support)",
    "Channel Classification",
];

/// Cursor over the set bits of a feature mask
///
/// The cursor starts before the first bit (`-1`). Every successful
/// [`next`](FeatureIterator::next) leaves it on a set bit; running off the end
/// leaves it past the last bit, where [`is_valid`](FeatureIterator::is_valid)
/// reports false until [`reset`](FeatureIterator::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureIterator {
    features: [u8; FEATURE_BYTES],
    index: i16,
}

impl FeatureIterator {
    /// Build an iterator over `data`, zero padded or truncated to eight bytes
    pub fn new(data: &[u8]) -> Self {
        let mut features = [0u8; FEATURE_BYTES];
        let length = data.len().min(FEATURE_BYTES);
        features[..length].copy_from_slice(&data[..length]);

        Self {
            features,
            index: -1,
        }
    }

    pub fn reset(&mut self) {
        self.index = -1;
    }

    pub fn is_valid(&self) -> bool {
        self.index >= 0 && self.index < FEATURE_BITS
    }

    /// Move to the next set bit, returns false once the mask is exhausted
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        if self.index < FEATURE_BITS {
            self.index += 1;
        }

        while self.index < FEATURE_BITS && !self.bit_set(self.index) {
            self.index += 1;
        }

        self.index < FEATURE_BITS
    }

    /// Bit number under the cursor (byte * 8 + bit)
    pub fn feature(&self) -> u8 {
        self.index as u8
    }

    /// Test bits of `byte` against `mask` without moving the cursor
    pub fn has_features(&self, byte: u8, mask: u8) -> bool {
        self.features
            .get(byte as usize)
            .map(|value| value & mask != 0)
            .unwrap_or(false)
    }

    /// Human readable name of the feature under the cursor
    pub fn text(&self) -> Option<&'static str> {
        if !self.is_valid() {
            return None;
        }
        Some(
            LE_FEATURE_NAMES
                .get(self.index as usize)
                .copied()
                .unwrap_or("Reserved"),
        )
    }

    /// Raw mask bytes
    pub fn as_bytes(&self) -> &[u8; FEATURE_BYTES] {
        &self.features
    }

    fn bit_set(&self, index: i16) -> bool {
        self.features[(index >> 3) as usize] & (1 << (index & 0x7)) != 0
    }
}

impl Iterator for FeatureIterator {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if FeatureIterator::next(self) {
            Some(self.feature())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_set_bits_in_order() {
        // bits 0, 9 and 63
        let mut features = FeatureIterator::new(&[0x01, 0x02, 0, 0, 0, 0, 0, 0x80]);
        let mut seen = Vec::new();

        while FeatureIterator::next(&mut features) {
            assert!(features.is_valid());
            seen.push(features.feature());
        }

        assert_eq!(seen, vec![0, 9, 63]);
        assert!(!features.is_valid());
        assert!(!FeatureIterator::next(&mut features));
    }

    #[test]
    fn test_reset_rescans() {
        let mut features = FeatureIterator::new(&[0x10]);
        assert_eq!(Iterator::next(&mut features), Some(4));
        assert_eq!(Iterator::next(&mut features), None);

        features.reset();
        assert!(!features.is_valid());
        assert_eq!(features.collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let features = FeatureIterator::new(&[0xFF, 0x01]);
        assert_eq!(features.as_bytes(), &[0xFF, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(features.count(), 9);

        let empty = FeatureIterator::new(&[]);
        assert_eq!(empty.count(), 0);
    }

    #[test]
    fn test_has_features() {
        let features = FeatureIterator::new(&[0x00, 0x09]);
        assert!(features.has_features(1, 0x08));
        assert!(features.has_features(1, 0x01));
        assert!(!features.has_features(1, 0x02));
        assert!(!features.has_features(0, 0xFF));
        assert!(!features.has_features(8, 0xFF));
    }

    #[test]
    fn test_text_uses_bit_number() {
        let mut features = FeatureIterator::new(&[0x01, 0x01, 0, 0, 0, 0x80]);
        assert_eq!(features.text(), None);

        assert!(FeatureIterator::next(&mut features));
        assert_eq!(features.text(), Some("LE Encryption"));

        assert!(FeatureIterator::next(&mut features));
        assert_eq!(features.feature(), 8);
        assert_eq!(features.text(), Some("LE 2M PHY"));

        assert!(FeatureIterator::next(&mut features));
        assert_eq!(features.feature(), 47);
        assert_eq!(features.text(), Some("Reserved"));
    }
}
