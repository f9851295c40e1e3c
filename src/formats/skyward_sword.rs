//! Skyward Sword save files.
//!
//! A save is exactly 0xFBE0 big-endian bytes: a region magic, a fixed header
//! value at 0x1C, three 0x53C0-byte quests from 0x20 and, at 0xFB60, a
//! 0x24-byte skip-data block per quest. Quests are kept as raw bytes with
//! typed accessors so unknown regions of the slot survive untouched.

use serde::Serialize;
use tracing::warn;

use crate::checksums::crc32_default;
use crate::error::FormatError;
use crate::io::{Endian, MemoryReader, MemoryWriter, Reader, SeekOrigin, VectorWriter, Writer};

pub const FILE_SIZE: usize = 0xFBE0;
pub const QUEST_SIZE: usize = 0x53C0;
pub const SKIP_SIZE: usize = 0x24;
pub const MAX_QUESTS: usize = 3;

const HEADER_OFFSET: u64 = 0x1C;
const HEADER_VALUE: u32 = 0x1D;
const QUEST_BASE: u64 = 0x20;
const SKIP_BASE: u64 = 0xFB60;

const NAME_OFFSET: usize = 0x08D4;
const NAME_LENGTH: usize = 8;
const RUPEE_COUNT_OFFSET: usize = 0x0A5E;
const AMMO_COUNT_OFFSET: usize = 0x0A60;
const MAX_HP_OFFSET: usize = 0x5302;
const SPAWN_HP_OFFSET: usize = 0x5304;
const CURRENT_HP_OFFSET: usize = 0x5306;
const ROOM_ID_OFFSET: usize = 0x5309;
const CURRENT_LOCATION_OFFSET: usize = 0x531C;
const CURRENT_AREA_OFFSET: usize = 0x533C;
const CURRENT_LOCATION_COPY_OFFSET: usize = 0x535C;
const IS_NEW_OFFSET: usize = 0x53AD;
const CHECKSUM_OFFSET: usize = 0x53BC;
const SKIP_CHECKSUM_OFFSET: usize = 0x20;

/// Game region, identified by the file magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    Ntsc,
    NtscJ,
    Pal,
}

impl Region {
    #[must_use]
    pub const fn magic(self) -> u32 {
        match self {
            Self::Ntsc => 0x534F_5545,
            Self::NtscJ => 0x534F_554A,
            Self::Pal => 0x534F_5550,
        }
    }

    #[must_use]
    pub const fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            0x534F_5545 => Some(Self::Ntsc),
            0x534F_554A => Some(Self::NtscJ),
            0x534F_5550 => Some(Self::Pal),
            _ => None,
        }
    }
}

/// Ammunition packed into the bitfield at 0xA60.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmmoType {
    Arrows,
    Bombs,
    Seeds,
}

impl AmmoType {
    const fn shift(self) -> u32 {
        match self {
            Self::Arrows => 0,
            Self::Bombs => 7,
            Self::Seeds => 23,
        }
    }
}

const AMMO_MASK: u32 = 0x7F;

// ============================================================================
// Quest
// ============================================================================

/// One quest slot plus its skip data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkywardSwordQuest {
    data: Vec<u8>,
    skip_data: [u8; SKIP_SIZE],
}

impl Default for SkywardSwordQuest {
    fn default() -> Self {
        Self {
            data: vec![0; QUEST_SIZE],
            skip_data: [0; SKIP_SIZE],
        }
    }
}

impl SkywardSwordQuest {
    /// Wraps raw slot bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::BadSize`] unless `data` is 0x53C0 bytes and
    /// `skip_data` is 0x24 bytes.
    pub fn from_parts(data: Vec<u8>, skip_data: &[u8]) -> Result<Self, FormatError> {
        if data.len() != QUEST_SIZE {
            return Err(FormatError::BadSize {
                what: "Skyward Sword quest",
                expected: QUEST_SIZE,
                actual: data.len(),
            });
        }
        let skip_data: [u8; SKIP_SIZE] =
            skip_data.try_into().map_err(|_| FormatError::BadSize {
                what: "Skyward Sword skip data",
                expected: SKIP_SIZE,
                actual: skip_data.len(),
            })?;
        Ok(Self { data, skip_data })
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[must_use]
    pub const fn skip_data(&self) -> &[u8; SKIP_SIZE] {
        &self.skip_data
    }

    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_be_bytes([self.data[offset], self.data[offset + 1]])
    }

    fn set_u16_at(&mut self, offset: usize, value: u16) {
        self.data[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    fn c_string_at(&self, offset: usize) -> String {
        let mut reader = MemoryReader::new(&self.data[offset..]);
        reader.read_string(None).unwrap_or_default()
    }

    /// Player name, at most eight UTF-16 units.
    #[must_use]
    pub fn player_name(&self) -> String {
        let field = &self.data[NAME_OFFSET..NAME_OFFSET + NAME_LENGTH * 2];
        MemoryReader::with_endian(field, Endian::Big)
            .read_wstring(Some(NAME_LENGTH))
            .unwrap_or_default()
    }

    /// Stores `name`, truncated to eight UTF-16 units and zero-padded.
    pub fn set_player_name(&mut self, name: &str) {
        let units = name.encode_utf16().count();
        if units > NAME_LENGTH {
            warn!(player_name = name, "name longer than 8 characters, truncating");
        }
        let field = &mut self.data[NAME_OFFSET..NAME_OFFSET + NAME_LENGTH * 2];
        let mut writer = MemoryWriter::with_endian(field, Endian::Big);
        // The field is exactly NAME_LENGTH units so the write always fits.
        let _ = writer.write_wstring(name, Some(NAME_LENGTH));
    }

    #[must_use]
    pub fn rupee_count(&self) -> u16 {
        self.u16_at(RUPEE_COUNT_OFFSET)
    }

    pub fn set_rupee_count(&mut self, value: u16) {
        self.set_u16_at(RUPEE_COUNT_OFFSET, value);
    }

    #[must_use]
    pub fn ammo_count(&self, kind: AmmoType) -> u32 {
        (Self::u32_at(&self.data, AMMO_COUNT_OFFSET) >> kind.shift()) & AMMO_MASK
    }

    /// Sets one ammo counter; only the low 7 bits of `count` are kept.
    pub fn set_ammo_count(&mut self, kind: AmmoType, count: u32) {
        let shift = kind.shift();
        let packed = Self::u32_at(&self.data, AMMO_COUNT_OFFSET);
        let packed = (packed & !(AMMO_MASK << shift)) | ((count & AMMO_MASK) << shift);
        self.data[AMMO_COUNT_OFFSET..AMMO_COUNT_OFFSET + 4].copy_from_slice(&packed.to_be_bytes());
    }

    #[must_use]
    pub fn max_hp(&self) -> u16 {
        self.u16_at(MAX_HP_OFFSET)
    }

    pub fn set_max_hp(&mut self, value: u16) {
        self.set_u16_at(MAX_HP_OFFSET, value);
    }

    #[must_use]
    pub fn max_hearts(&self) -> f32 {
        f32::from(self.max_hp()) / 4.0
    }

    #[must_use]
    pub fn spawn_hp(&self) -> u16 {
        self.u16_at(SPAWN_HP_OFFSET)
    }

    pub fn set_spawn_hp(&mut self, value: u16) {
        self.set_u16_at(SPAWN_HP_OFFSET, value);
    }

    #[must_use]
    pub fn spawn_hearts(&self) -> f32 {
        f32::from(self.spawn_hp()) / 4.0
    }

    #[must_use]
    pub fn current_hp(&self) -> u16 {
        self.u16_at(CURRENT_HP_OFFSET)
    }

    pub fn set_current_hp(&mut self, value: u16) {
        self.set_u16_at(CURRENT_HP_OFFSET, value);
    }

    #[must_use]
    pub fn current_hearts(&self) -> f32 {
        f32::from(self.current_hp()) / 4.0
    }

    #[must_use]
    pub fn room_id(&self) -> u8 {
        self.data[ROOM_ID_OFFSET]
    }

    pub fn set_room_id(&mut self, value: u8) {
        self.data[ROOM_ID_OFFSET] = value;
    }

    #[must_use]
    pub fn current_location(&self) -> String {
        self.c_string_at(CURRENT_LOCATION_OFFSET)
    }

    #[must_use]
    pub fn current_area(&self) -> String {
        self.c_string_at(CURRENT_AREA_OFFSET)
    }

    #[must_use]
    pub fn current_location_copy(&self) -> String {
        self.c_string_at(CURRENT_LOCATION_COPY_OFFSET)
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.data[IS_NEW_OFFSET] != 0
    }

    pub fn set_new(&mut self, value: bool) {
        self.data[IS_NEW_OFFSET] = u8::from(value);
    }

    #[must_use]
    pub fn slot_checksum(&self) -> u32 {
        Self::u32_at(&self.data, CHECKSUM_OFFSET)
    }

    #[must_use]
    pub fn skip_checksum(&self) -> u32 {
        Self::u32_at(&self.skip_data, SKIP_CHECKSUM_OFFSET)
    }

    #[must_use]
    pub fn computed_slot_checksum(&self) -> u32 {
        crc32_default(&self.data[..CHECKSUM_OFFSET])
    }

    #[must_use]
    pub fn computed_skip_checksum(&self) -> u32 {
        crc32_default(&self.skip_data[..SKIP_CHECKSUM_OFFSET])
    }

    /// Recomputes both checksums. Returns true if either changed.
    pub fn fix_checksums(&mut self) -> bool {
        let slot = self.computed_slot_checksum();
        let skip = self.computed_skip_checksum();
        let changed = slot != self.slot_checksum() || skip != self.skip_checksum();
        self.data[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&slot.to_be_bytes());
        self.skip_data[SKIP_CHECKSUM_OFFSET..SKIP_CHECKSUM_OFFSET + 4]
            .copy_from_slice(&skip.to_be_bytes());
        changed
    }

    #[must_use]
    pub fn checksums(&self) -> QuestChecksums {
        QuestChecksums {
            slot_stored: self.slot_checksum(),
            slot_computed: self.computed_slot_checksum(),
            skip_stored: self.skip_checksum(),
            skip_computed: self.computed_skip_checksum(),
        }
    }
}

/// Stored versus computed checksums for one quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestChecksums {
    pub slot_stored: u32,
    pub slot_computed: u32,
    pub skip_stored: u32,
    pub skip_computed: u32,
}

impl QuestChecksums {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.slot_stored == self.slot_computed && self.skip_stored == self.skip_computed
    }
}

// ============================================================================
// File
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkywardSwordFile {
    pub region: Region,
    quests: Vec<SkywardSwordQuest>,
}

impl SkywardSwordFile {
    #[must_use]
    pub const fn new(region: Region) -> Self {
        Self {
            region,
            quests: Vec::new(),
        }
    }

    /// Appends a quest. Returns false, leaving the file unchanged, once three
    /// quests are present.
    pub fn add_quest(&mut self, quest: SkywardSwordQuest) -> bool {
        if self.quests.len() >= MAX_QUESTS {
            warn!("Skyward Sword save already holds {MAX_QUESTS} quests");
            return false;
        }
        self.quests.push(quest);
        true
    }

    #[must_use]
    pub fn quest(&self, index: usize) -> Option<&SkywardSwordQuest> {
        self.quests.get(index)
    }

    pub fn quest_mut(&mut self, index: usize) -> Option<&mut SkywardSwordQuest> {
        self.quests.get_mut(index)
    }

    #[must_use]
    pub fn quests(&self) -> &[SkywardSwordQuest] {
        &self.quests
    }

    /// Parses a whole save.
    ///
    /// # Errors
    ///
    /// - [`FormatError::BadSize`] unless the stream is exactly 0xFBE0 bytes.
    /// - [`FormatError::BadMagic`] for an unknown region magic.
    /// - [`FormatError::InvalidData`] if the header value is not 0x1D.
    pub fn read<R: Reader>(reader: &mut R) -> Result<Self, FormatError> {
        let length = usize::try_from(reader.length()).unwrap_or(usize::MAX);
        if length != FILE_SIZE {
            return Err(FormatError::BadSize {
                what: "Skyward Sword save",
                expected: FILE_SIZE,
                actual: length,
            });
        }
        reader.set_endian(Endian::Big);
        reader.seek(0, SeekOrigin::Begin)?;

        let magic = reader.read_u32()?;
        let region = Region::from_magic(magic).ok_or(FormatError::BadMagic {
            format: "Skyward Sword",
            found: magic,
        })?;

        reader.seek(seek_offset(HEADER_OFFSET), SeekOrigin::Begin)?;
        let header = reader.read_u32()?;
        if header != HEADER_VALUE {
            return Err(FormatError::InvalidData(format!(
                "invalid header value {header:#x}, expected {HEADER_VALUE:#x}"
            )));
        }

        let mut file = Self::new(region);
        for index in 0..MAX_QUESTS {
            let data = reader.read_ubytes(QUEST_SIZE)?;
            let resume = reader.position();
            reader.seek(seek_offset(skip_offset(index)), SeekOrigin::Begin)?;
            let skip = reader.read_ubytes(SKIP_SIZE)?;
            reader.seek(seek_offset(resume), SeekOrigin::Begin)?;
            file.quests.push(SkywardSwordQuest::from_parts(data, &skip)?);
        }
        Ok(file)
    }

    /// # Errors
    ///
    /// See [`SkywardSwordFile::read`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        Self::read(&mut MemoryReader::new(data))
    }

    /// Fixes every quest's checksums and returns how many quests changed.
    pub fn fix_checksums(&mut self) -> usize {
        self.quests
            .iter_mut()
            .map(SkywardSwordQuest::fix_checksums)
            .filter(|changed| *changed)
            .count()
    }

    #[must_use]
    pub fn verify_checksums(&self) -> Vec<QuestChecksums> {
        self.quests.iter().map(SkywardSwordQuest::checksums).collect()
    }

    /// Fixes checksums, then writes the magic, header value, quests and skip
    /// data, padding the output to 0xFBE0 bytes.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    pub fn write<W: Writer>(&mut self, writer: &mut W) -> Result<(), FormatError> {
        self.fix_checksums();
        writer.set_endian(Endian::Big);
        writer.write_u32(self.region.magic())?;
        writer.write_zero_to(HEADER_OFFSET)?;
        writer.write_u32(HEADER_VALUE)?;

        for (index, quest) in self.quests.iter().enumerate() {
            writer.seek_fill(QUEST_BASE + (index * QUEST_SIZE) as u64)?;
            writer.write_ubytes(&quest.data)?;
            writer.seek_fill(skip_offset(index))?;
            writer.write_ubytes(&quest.skip_data)?;
        }
        writer.seek_fill(FILE_SIZE as u64)?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`SkywardSwordFile::write`].
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, FormatError> {
        let mut writer = VectorWriter::with_endian(Endian::Big);
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }

    #[must_use]
    pub fn summary(&self) -> SkywardSwordSummary {
        SkywardSwordSummary {
            region: self.region,
            quests: self
                .quests
                .iter()
                .enumerate()
                .map(|(slot, quest)| QuestSummary {
                    slot,
                    player_name: quest.player_name(),
                    is_new: quest.is_new(),
                    rupees: quest.rupee_count(),
                    current_hearts: quest.current_hearts(),
                    max_hearts: quest.max_hearts(),
                    arrows: quest.ammo_count(AmmoType::Arrows),
                    bombs: quest.ammo_count(AmmoType::Bombs),
                    seeds: quest.ammo_count(AmmoType::Seeds),
                    location: quest.current_location(),
                    area: quest.current_area(),
                    checksums: quest.checksums(),
                })
                .collect(),
        }
    }
}

const fn skip_offset(index: usize) -> u64 {
    SKIP_BASE + (index * SKIP_SIZE) as u64
}

fn seek_offset(pos: u64) -> i64 {
    i64::try_from(pos).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestSummary {
    pub slot: usize,
    pub player_name: String,
    pub is_new: bool,
    pub rupees: u16,
    pub current_hearts: f32,
    pub max_hearts: f32,
    pub arrows: u32,
    pub bombs: u32,
    pub seeds: u32,
    pub location: String,
    pub area: String,
    pub checksums: QuestChecksums,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkywardSwordSummary {
    pub region: Region,
    pub quests: Vec<QuestSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SkywardSwordFile {
        let mut file = SkywardSwordFile::new(Region::Pal);
        for (i, name) in ["Link", "Zelda", "Groose"].iter().enumerate() {
            let mut quest = SkywardSwordQuest::default();
            quest.set_player_name(name);
            quest.set_rupee_count(u16::try_from(i * 50).unwrap());
            quest.set_max_hp(24);
            quest.set_current_hp(10);
            assert!(file.add_quest(quest));
        }
        file
    }

    #[test]
    fn write_then_read() {
        let mut file = sample();
        let bytes = file.to_bytes().unwrap();
        assert_eq!(bytes.len(), FILE_SIZE);
        assert_eq!(&bytes[..4], b"SOUP");
        assert_eq!(&bytes[0x1C..0x20], &[0, 0, 0, 0x1D]);

        let read = SkywardSwordFile::from_bytes(&bytes).unwrap();
        assert_eq!(read.region, Region::Pal);
        assert_eq!(read.quests().len(), 3);
        assert_eq!(read.quest(1).unwrap().player_name(), "Zelda");
        assert_eq!(read.quest(2).unwrap().rupee_count(), 100);
        assert!(read.verify_checksums().iter().all(QuestChecksums::is_valid));
    }

    #[test]
    fn hearts_are_quarter_hp() {
        let quest = &sample().quests[0];
        assert!((quest.max_hearts() - 6.0).abs() < f32::EPSILON);
        assert!((quest.current_hearts() - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn ammo_fields_are_independent() {
        let mut quest = SkywardSwordQuest::default();
        quest.set_ammo_count(AmmoType::Arrows, 20);
        quest.set_ammo_count(AmmoType::Bombs, 10);
        quest.set_ammo_count(AmmoType::Seeds, 0xFF);
        assert_eq!(quest.ammo_count(AmmoType::Arrows), 20);
        assert_eq!(quest.ammo_count(AmmoType::Bombs), 10);
        assert_eq!(quest.ammo_count(AmmoType::Seeds), 0x7F);
        let raw = u32::from_be_bytes(quest.data()[0xA60..0xA64].try_into().unwrap());
        assert_eq!(raw, 20 | (10 << 7) | (0x7F << 23));
    }

    #[test]
    fn name_is_truncated_to_eight_units() {
        let mut quest = SkywardSwordQuest::default();
        quest.set_player_name("Loftwingers");
        assert_eq!(quest.player_name(), "Loftwing");
        quest.set_player_name("Fi");
        assert_eq!(quest.player_name(), "Fi");
    }

    #[test]
    fn corrupted_quest_is_reported_and_fixed() {
        let mut file = sample();
        let mut bytes = file.to_bytes().unwrap();
        bytes[0x20 + 0x100] ^= 0x55;

        let mut read = SkywardSwordFile::from_bytes(&bytes).unwrap();
        let report = read.verify_checksums();
        assert!(!report[0].is_valid());
        assert!(report[1].is_valid());
        assert_eq!(read.fix_checksums(), 1);
        assert!(read.verify_checksums().iter().all(QuestChecksums::is_valid));
    }

    #[test]
    fn rejects_wrong_size_and_magic() {
        assert!(matches!(
            SkywardSwordFile::from_bytes(&[0u8; 16]),
            Err(FormatError::BadSize { .. })
        ));
        let mut bytes = sample().to_bytes().unwrap();
        bytes[3] = b'X';
        assert!(matches!(
            SkywardSwordFile::from_bytes(&bytes),
            Err(FormatError::BadMagic { .. })
        ));
    }

    #[test]
    fn strings_and_flags() {
        let mut quest = SkywardSwordQuest::default();
        quest.data[CURRENT_LOCATION_OFFSET..CURRENT_LOCATION_OFFSET + 7].copy_from_slice(b"Skyloft");
        quest.set_new(true);
        assert_eq!(quest.current_location(), "Skyloft");
        assert!(quest.is_new());
        assert_eq!(quest.current_area(), "");
    }

    #[test]
    fn fourth_quest_is_refused() {
        let mut file = sample();
        assert!(!file.add_quest(SkywardSwordQuest::default()));
        assert_eq!(file.quests().len(), 3);
    }
}
