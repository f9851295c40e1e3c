//! Minish Cap EEPROM saves.
//!
//! Dumps are usually scrambled: every 8-byte block is stored reversed. A
//! plain image starts with the ASCII version string, whose first word reads
//! `AGBZ`, so anything else is treated as scrambled.

use serde::Serialize;
use tracing::debug;

use crate::error::FormatError;

pub const VERSION_EU_JP: &[u8; 31] = b"AGBZELDA:THE MINISH CAP:ZELDA 3";
pub const VERSION_US: &[u8; 31] = b"AGBZELDA:THE MINISH CAP:ZELDA 5";

pub const SLOT_COUNT: usize = 3;
pub const SLOT_SIZE: usize = 0x500;
const SLOT_BASE: usize = 0x80;
const SLOT_HEADER_BASE: usize = 0x30;
const SLOT_HEADER_STRIDE: usize = 0x10;
const CHECKSUM_WORD_OFFSET: usize = 0x34;

/// First word of an unscrambled image, `AGBZ` little-endian.
const PLAIN_MARKER: u32 = 0x5A42_4741;
const BLOCK_SIZE: usize = 8;

/// Smallest image that holds all three slots.
pub const MIN_SIZE: usize = SLOT_BASE + SLOT_SIZE * SLOT_COUNT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Version {
    EuJp,
    Us,
}

/// State of a save slot, stored as a little-endian word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotMarker {
    New,
    Valid,
    Deleted,
}

impl SlotMarker {
    #[must_use]
    pub const fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            0x5449_4E49 => Some(Self::New),
            0x4D43_5A33 => Some(Self::Valid),
            0x466C_6544 => Some(Self::Deleted),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::New => 0x5449_4E49,
            Self::Valid => 0x4D43_5A33,
            Self::Deleted => 0x466C_6544,
        }
    }
}

/// Reverses every whole 8-byte block in place. Applying it twice restores
/// the input; a trailing partial block is left alone.
pub fn unscramble(data: &mut [u8]) {
    for block in data.chunks_exact_mut(BLOCK_SIZE) {
        block.reverse();
    }
}

/// Wrapping sum of each little-endian word xored with a counter that starts
/// at `data.len()` and drops by two per word.
#[must_use]
pub fn checksum(data: &[u8]) -> u16 {
    let mut counter = data.len();
    let mut sum = 0u16;
    for word in data.chunks_exact(2) {
        #[allow(clippy::cast_possible_truncation)]
        let mask = counter as u16;
        sum = sum.wrapping_add(u16::from_le_bytes([word[0], word[1]]) ^ mask);
        counter = counter.wrapping_sub(2);
    }
    sum
}

fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]])
}

/// A borrowed view of one save slot.
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    pub index: usize,
    pub raw_marker: u32,
    pub data: &'a [u8],
}

impl Slot<'_> {
    #[must_use]
    pub const fn marker(&self) -> Option<SlotMarker> {
        SlotMarker::from_u32(self.raw_marker)
    }
}

/// An unscrambled EEPROM image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinishCapFile {
    data: Vec<u8>,
    was_scrambled: bool,
}

impl MinishCapFile {
    /// Takes a raw dump, unscrambling it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BadSize`] if the image cannot hold three slots.
    pub fn from_bytes(mut data: Vec<u8>) -> Result<Self, FormatError> {
        if data.len() < MIN_SIZE {
            return Err(FormatError::BadSize {
                what: "Minish Cap save",
                expected: MIN_SIZE,
                actual: data.len(),
            });
        }
        let was_scrambled = le_u32(&data, 0) != PLAIN_MARKER;
        if was_scrambled {
            debug!(len = data.len(), "unscrambling Minish Cap image");
            unscramble(&mut data);
        }
        Ok(Self {
            data,
            was_scrambled,
        })
    }

    #[must_use]
    pub const fn was_scrambled(&self) -> bool {
        self.was_scrambled
    }

    /// Unscrambled image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub fn version(&self) -> Option<Version> {
        let head = &self.data[..VERSION_US.len()];
        if head == VERSION_EU_JP {
            Some(Version::EuJp)
        } else if head == VERSION_US {
            Some(Version::Us)
        } else {
            None
        }
    }

    #[must_use]
    pub fn slot(&self, index: usize) -> Option<Slot<'_>> {
        if index >= SLOT_COUNT {
            return None;
        }
        let start = SLOT_BASE + SLOT_SIZE * index;
        Some(Slot {
            index,
            raw_marker: le_u32(&self.data, SLOT_HEADER_BASE + SLOT_HEADER_STRIDE * index),
            data: &self.data[start..start + SLOT_SIZE],
        })
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot<'_>> {
        (0..SLOT_COUNT).filter_map(|index| self.slot(index))
    }

    /// Mutable access to one slot's bytes.
    pub fn slot_data_mut(&mut self, index: usize) -> Option<&mut [u8]> {
        if index >= SLOT_COUNT {
            return None;
        }
        let start = SLOT_BASE + SLOT_SIZE * index;
        Some(&mut self.data[start..start + SLOT_SIZE])
    }

    /// Combined checksum of a slot's header word and its data.
    ///
    /// The high half holds the 16-bit sum, the low half its two's complement.
    /// Indices past the last slot are clamped.
    #[must_use]
    pub fn slot_checksum(&self, game: usize) -> u32 {
        let game = game.min(SLOT_COUNT - 1);
        let header = CHECKSUM_WORD_OFFSET + SLOT_HEADER_STRIDE * game;
        let slot = SLOT_BASE + SLOT_SIZE * game;
        let sum = checksum(&self.data[header..header + 4])
            .wrapping_add(checksum(&self.data[slot..slot + SLOT_SIZE]));
        (u32::from(sum) << 16) | u32::from(sum.wrapping_neg())
    }

    /// Serializes the image, scrambling it when asked.
    #[must_use]
    pub fn to_bytes(&self, scramble: bool) -> Vec<u8> {
        let mut out = self.data.clone();
        if scramble {
            unscramble(&mut out);
        }
        out
    }

    #[must_use]
    pub fn summary(&self) -> MinishCapSummary {
        MinishCapSummary {
            version: self.version(),
            scrambled: self.was_scrambled,
            slots: self
                .slots()
                .map(|slot| SlotSummary {
                    index: slot.index,
                    marker: slot.marker(),
                    raw_marker: slot.raw_marker,
                    checksum: self.slot_checksum(slot.index),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub index: usize,
    pub marker: Option<SlotMarker>,
    pub raw_marker: u32,
    pub checksum: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinishCapSummary {
    pub version: Option<Version>,
    pub scrambled: bool,
    pub slots: Vec<SlotSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_image() -> Vec<u8> {
        let mut data = vec![0u8; 0x2000];
        data[..VERSION_US.len()].copy_from_slice(VERSION_US);
        data[0x30..0x34].copy_from_slice(&SlotMarker::Valid.as_u32().to_le_bytes());
        data[0x40..0x44].copy_from_slice(&SlotMarker::Deleted.as_u32().to_le_bytes());
        data[0x50..0x54].copy_from_slice(&SlotMarker::New.as_u32().to_le_bytes());
        for (i, byte) in data[SLOT_BASE..SLOT_BASE + SLOT_SIZE].iter_mut().enumerate() {
            *byte = u8::try_from(i % 251).unwrap();
        }
        data
    }

    #[test]
    fn unscramble_reverses_blocks_and_is_an_involution() {
        let mut data: Vec<u8> = (0..20).collect();
        unscramble(&mut data);
        assert_eq!(&data[..8], &[7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(&data[16..], &[16, 17, 18, 19]);
        unscramble(&mut data);
        assert_eq!(data, (0..20).collect::<Vec<u8>>());
    }

    #[test]
    fn plain_image_is_detected() {
        let file = MinishCapFile::from_bytes(plain_image()).unwrap();
        assert!(!file.was_scrambled());
        assert_eq!(file.version(), Some(Version::Us));
    }

    #[test]
    fn scrambled_image_is_unscrambled() {
        let plain = plain_image();
        let mut scrambled = plain.clone();
        unscramble(&mut scrambled);

        let file = MinishCapFile::from_bytes(scrambled.clone()).unwrap();
        assert!(file.was_scrambled());
        assert_eq!(file.data(), plain.as_slice());
        assert_eq!(file.to_bytes(true), scrambled);
        assert_eq!(file.to_bytes(false), plain);
    }

    #[test]
    fn slot_markers() {
        let file = MinishCapFile::from_bytes(plain_image()).unwrap();
        let markers: Vec<_> = file.slots().map(|s| s.marker()).collect();
        assert_eq!(
            markers,
            [Some(SlotMarker::Valid), Some(SlotMarker::Deleted), Some(SlotMarker::New)]
        );
        assert!(file.slot(3).is_none());
        assert_eq!(file.slot(0).unwrap().data.len(), SLOT_SIZE);
    }

    #[test]
    fn checksum_xors_a_falling_counter() {
        assert_eq!(checksum(&[0x00, 0x00, 0x00, 0x00]), 4 + 2);
        assert_eq!(checksum(&[0x01, 0x00]), 0x01 ^ 2);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn slot_checksum_halves_cancel() {
        let file = MinishCapFile::from_bytes(plain_image()).unwrap();
        for game in 0..SLOT_COUNT {
            let value = file.slot_checksum(game);
            let high = u16::try_from(value >> 16).unwrap();
            let low = u16::try_from(value & 0xFFFF).unwrap();
            assert_eq!(high.wrapping_add(low), 0);
        }
    }

    #[test]
    fn short_image_is_rejected() {
        assert!(matches!(
            MinishCapFile::from_bytes(vec![0; 0x100]),
            Err(FormatError::BadSize { .. })
        ));
    }
}
