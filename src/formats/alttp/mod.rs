//! A Link to the Past SRAM saves.
//!
//! The file holds six 0x500-byte slots: three quests followed by their
//! backups. All values are little-endian and each slot ends with a 16-bit
//! checksum chosen so that the slot's words sum to 0x5A5A.

pub mod enums;
pub mod flags;
pub mod quest;

use serde::Serialize;
use tracing::debug;

use crate::error::FormatError;
use crate::io::{MemoryReader, Reader, SeekOrigin, VectorWriter, Writer};

pub use quest::{CHECKSUM_OFFSET, Inventory, Quest, SLOT_SIZE};

/// Number of primary quests (and of backups).
pub const QUEST_COUNT: usize = 3;
/// Bytes covered by the six slots.
pub const FILE_SIZE: usize = SLOT_SIZE * QUEST_COUNT * 2;

const CHECKSUM_BASE: u16 = 0x5A5A;

/// Computes the checksum of one slot from its first 0x4FE bytes.
///
/// Returns `0x5A5A` minus the wrapping sum of the little-endian words.
#[must_use]
pub fn calculate_checksum(slot: &[u8]) -> u16 {
    let end = slot.len().min(quest::CHECKSUM_OFFSET as usize);
    let sum = slot[..end]
        .chunks_exact(2)
        .fold(0u16, |sum, word| sum.wrapping_add(u16::from_le_bytes([word[0], word[1]])));
    CHECKSUM_BASE.wrapping_sub(sum)
}

/// Stored and computed checksum of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotChecksum {
    pub slot: usize,
    pub stored: u16,
    pub computed: u16,
}

impl SlotChecksum {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.stored == self.computed
    }
}

fn check_size(data: &[u8]) -> Result<(), FormatError> {
    if data.len() < FILE_SIZE {
        return Err(FormatError::BadSize {
            what: "ALTTP save",
            expected: FILE_SIZE,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Checks every slot's checksum in raw save data.
///
/// # Errors
///
/// Returns [`FormatError::BadSize`] if the data is too short for six slots.
pub fn verify_checksums(data: &[u8]) -> Result<Vec<SlotChecksum>, FormatError> {
    check_size(data)?;
    Ok(data[..FILE_SIZE]
        .chunks_exact(SLOT_SIZE)
        .enumerate()
        .map(|(slot, bytes)| {
            let offset = quest::CHECKSUM_OFFSET as usize;
            SlotChecksum {
                slot,
                stored: u16::from_le_bytes([bytes[offset], bytes[offset + 1]]),
                computed: calculate_checksum(bytes),
            }
        })
        .collect())
}

/// Rewrites every slot checksum in place and returns how many changed.
///
/// # Errors
///
/// Returns [`FormatError::BadSize`] if the data is too short for six slots.
pub fn fix_checksums(data: &mut [u8]) -> Result<usize, FormatError> {
    let mut fixed = 0;
    for entry in verify_checksums(data)? {
        if !entry.is_valid() {
            let at = entry.slot * SLOT_SIZE + quest::CHECKSUM_OFFSET as usize;
            data[at..at + 2].copy_from_slice(&entry.computed.to_le_bytes());
            debug!(slot = entry.slot, checksum = entry.computed, "fixed ALTTP slot checksum");
            fixed += 1;
        }
    }
    Ok(fixed)
}

// ============================================================================
// File
// ============================================================================

/// A parsed ALTTP save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlttpFile {
    pub quests: Vec<Quest>,
    pub backups: Vec<Quest>,
}

impl Default for AlttpFile {
    fn default() -> Self {
        Self {
            quests: vec![Quest::default(); QUEST_COUNT],
            backups: vec![Quest::default(); QUEST_COUNT],
        }
    }
}

impl AlttpFile {
    /// Reads all six slots from the start of `reader`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BadSize`] if the stream is too short.
    pub fn read<R: Reader>(reader: &mut R) -> Result<Self, FormatError> {
        let length = usize::try_from(reader.length()).unwrap_or(usize::MAX);
        if length < FILE_SIZE {
            return Err(FormatError::BadSize {
                what: "ALTTP save",
                expected: FILE_SIZE,
                actual: length,
            });
        }

        let mut slots = Vec::with_capacity(QUEST_COUNT * 2);
        for slot in 0..QUEST_COUNT * 2 {
            let base = i64::try_from(slot * SLOT_SIZE).unwrap_or(i64::MAX);
            reader.seek(base, SeekOrigin::Begin)?;
            slots.push(Quest::read(reader)?);
        }
        let backups = slots.split_off(QUEST_COUNT);
        Ok(Self {
            quests: slots,
            backups,
        })
    }

    /// # Errors
    ///
    /// See [`AlttpFile::read`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        Self::read(&mut MemoryReader::new(data))
    }

    /// Writes the three quests into both the primary and the backup slots,
    /// each followed by a freshly computed checksum.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidData`] unless exactly three quests are
    /// present, and propagates writer errors.
    pub fn write<W: Writer>(&self, writer: &mut W) -> Result<(), FormatError> {
        if self.quests.len() != QUEST_COUNT {
            return Err(FormatError::InvalidData(format!(
                "ALTTP save needs {QUEST_COUNT} quests, found {}",
                self.quests.len()
            )));
        }
        for quest in self.quests.iter().chain(&self.quests) {
            let mut slot = VectorWriter::new();
            quest.write_body(&mut slot)?;
            let checksum = calculate_checksum(slot.data());
            slot.write_u16_little(checksum)?;
            writer.write_ubytes(slot.data())?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`AlttpFile::write`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut writer = VectorWriter::new();
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }

    #[must_use]
    pub fn quest(&self, index: usize) -> Option<&Quest> {
        self.quests.get(index)
    }

    pub fn quest_mut(&mut self, index: usize) -> Option<&mut Quest> {
        self.quests.get_mut(index)
    }

    #[must_use]
    pub fn quest_count(&self) -> usize {
        self.quests.len()
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Per-slot overview used by `athena inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct SlotSummary {
    pub slot: usize,
    pub backup: bool,
    pub valid: bool,
    pub player_name: String,
    pub health: u8,
    pub health_max: u8,
    pub rupees: u16,
    pub progress: Option<enums::ProgressIndicator>,
    pub checksum: SlotChecksum,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlttpSummary {
    pub slots: Vec<SlotSummary>,
}

/// Parses `data` and describes every slot.
///
/// # Errors
///
/// See [`AlttpFile::read`].
pub fn summarize(data: &[u8]) -> Result<AlttpSummary, FormatError> {
    let file = AlttpFile::from_bytes(data)?;
    let checksums = verify_checksums(data)?;
    let slots = file
        .quests
        .iter()
        .chain(&file.backups)
        .zip(checksums)
        .enumerate()
        .map(|(slot, (quest, checksum))| SlotSummary {
            slot,
            backup: slot >= QUEST_COUNT,
            valid: quest.valid,
            player_name: quest.player_name_string(),
            health: quest.health,
            health_max: quest.health_max,
            rupees: quest.rupee_current,
            progress: quest.progress(),
            checksum,
        })
        .collect();
    Ok(AlttpSummary { slots })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AlttpFile {
        let mut file = AlttpFile::default();
        for (i, quest) in file.quests.iter_mut().enumerate() {
            quest.valid = true;
            quest.health_max = 0x18;
            quest.health = 0x10;
            quest.rupee_current = u16::try_from(i * 100).unwrap();
            quest.set_player_name(["LINK", "ZELDA", "IMPA"][i]);
        }
        file
    }

    #[test]
    fn checksum_makes_words_sum_to_constant() {
        let bytes = sample().to_bytes().unwrap();
        for slot in bytes.chunks_exact(SLOT_SIZE) {
            let total = slot
                .chunks_exact(2)
                .fold(0u16, |s, w| s.wrapping_add(u16::from_le_bytes([w[0], w[1]])));
            assert_eq!(total, 0x5A5A);
        }
    }

    #[test]
    fn write_duplicates_quests_into_backups() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(bytes.len(), FILE_SIZE);
        assert_eq!(bytes[..3 * SLOT_SIZE], bytes[3 * SLOT_SIZE..]);

        let read = AlttpFile::from_bytes(&bytes).unwrap();
        assert_eq!(read.quests, read.backups);
        assert_eq!(read.quest(1).unwrap().player_name_string(), "ZELDA");
    }

    #[test]
    fn verify_and_fix_checksums() {
        let mut bytes = sample().to_bytes().unwrap();
        assert!(verify_checksums(&bytes).unwrap().iter().all(SlotChecksum::is_valid));

        bytes[0x10] ^= 0xFF;
        bytes[4 * SLOT_SIZE + 0x20] ^= 0x01;
        let report = verify_checksums(&bytes).unwrap();
        assert!(!report[0].is_valid());
        assert!(!report[4].is_valid());
        assert!(report[1].is_valid());

        assert_eq!(fix_checksums(&mut bytes).unwrap(), 2);
        assert!(verify_checksums(&bytes).unwrap().iter().all(SlotChecksum::is_valid));
    }

    #[test]
    fn short_file_is_rejected() {
        assert!(matches!(
            AlttpFile::from_bytes(&[0u8; 0x100]),
            Err(FormatError::BadSize { .. })
        ));
    }

    /// A slot full of arbitrary bytes, with the reserved gaps zeroed and the
    /// valid marker set.
    fn noisy_slot(seed: u32) -> Vec<u8> {
        let mut state = seed;
        let mut slot: Vec<u8> = (0..SLOT_SIZE)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                state.to_le_bytes()[2]
            })
            .collect();
        for gap in [0x378..0x379, 0x38C..0x3C5, 0x3CB..0x3CC, 0x407..0x4FE] {
            slot[gap].fill(0);
        }
        slot[0x3E5..0x3E7].copy_from_slice(&quest::VALID_MARKER.to_le_bytes());
        slot
    }

    #[test]
    fn arbitrary_slots_round_trip_byte_for_byte() {
        let mut primary: Vec<u8> = (0..3).flat_map(noisy_slot).collect();
        primary[0x34F] = 0x03;
        primary[SLOT_SIZE + 0x342] = 0x02;
        let mut bytes = primary.repeat(2);
        fix_checksums(&mut bytes).unwrap();

        let file = AlttpFile::from_bytes(&bytes).unwrap();
        assert_eq!(file.quests[0].inventory.bottles, 3);
        assert!(file.quests[0].inventory.has_bottles());
        assert_eq!(file.to_bytes().unwrap(), bytes);
    }

    #[test]
    fn wrong_quest_count_is_rejected() {
        let mut file = sample();
        file.quests.pop();
        assert!(matches!(file.to_bytes(), Err(FormatError::InvalidData(_))));
    }

    #[test]
    fn summary_reports_slots() {
        let bytes = sample().to_bytes().unwrap();
        let summary = summarize(&bytes).unwrap();
        assert_eq!(summary.slots.len(), 6);
        assert!(summary.slots[4].backup);
        assert_eq!(summary.slots[2].player_name, "IMPA");
        assert!(summary.slots.iter().all(|s| s.checksum.is_valid()));
    }
}
