//! One 0x500-byte ALTTP save slot.

use serde::Serialize;
use tracing::warn;

use super::enums::{
    ArmorType, BoomerangType, BottleType, BowType, MagicType, MapIcon, ProgressIndicator,
    StartLocation, TagAlong,
};
use super::flags::{
    Abilities, Crystals, DungeonItemFlags, LightDarkWorld, MagicUsage, OverworldEvent, Pendants,
    ProgressFlags1, ProgressFlags2, RoomFlags,
};
use crate::error::StreamError;
use crate::io::{Reader, SeekOrigin, Writer};

pub const SLOT_SIZE: usize = 0x500;
pub const ROOM_COUNT: usize = 0x140;
pub const OVERWORLD_AREA_COUNT: usize = 0xC0;
pub const DUNGEON_KEY_COUNT: usize = 0x10;
pub const OLD_MAN_FLAG_COUNT: usize = 6;
pub const UNKNOWN1_COUNT: usize = 5;
pub const NAME_LENGTH: usize = 6;
pub const DUNGEON_COUNT: usize = 0x0D;

/// Marker stored at 0x3E5 in a slot that holds a save.
pub const VALID_MARKER: u16 = 0x55AA;
/// Offset of the slot checksum.
pub const CHECKSUM_OFFSET: u64 = 0x4FE;

/// Name tile for an unused character position.
const NAME_BLANK: u16 = 0xA9;

// ============================================================================
// Inventory
// ============================================================================

/// The 32-byte item block at slot offset 0x340.
///
/// Every byte is kept as stored. Items the game treats as owned or not
/// still hold other values in real saves (the bottle byte counts bottles),
/// so the `has_*` accessors test for non-zero instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub bow: u8,
    pub boomerang: u8,
    pub hookshot: u8,
    /// Bomb count.
    pub bombs: u8,
    pub magic: u8,
    pub fire_rod: u8,
    pub ice_rod: u8,
    pub bombos: u8,
    pub ether: u8,
    pub quake: u8,
    pub torch: u8,
    pub hammer: u8,
    pub flute: u8,
    pub bug_net: u8,
    pub book: u8,
    pub bottles: u8,
    pub somaria: u8,
    pub byrna: u8,
    pub magic_cape: u8,
    pub magic_mirror: u8,
    pub gloves: u8,
    pub boots: u8,
    pub flippers: u8,
    pub moon_pearl: u8,
    pub unused: u8,
    pub sword: u8,
    pub shield: u8,
    pub armor: u8,
    pub bottle_types: [u8; 4],
}

macro_rules! owned_items {
    ($($has:ident => $field:ident),* $(,)?) => {
        impl Inventory {
            $(
                #[must_use]
                pub const fn $has(&self) -> bool {
                    self.$field != 0
                }
            )*
        }
    };
}

owned_items! {
    has_hookshot => hookshot,
    has_fire_rod => fire_rod,
    has_ice_rod => ice_rod,
    has_bombos => bombos,
    has_ether => ether,
    has_quake => quake,
    has_torch => torch,
    has_hammer => hammer,
    has_bug_net => bug_net,
    has_book => book,
    has_bottles => bottles,
    has_somaria => somaria,
    has_byrna => byrna,
    has_magic_cape => magic_cape,
    has_flippers => flippers,
    has_moon_pearl => moon_pearl,
}

impl Inventory {
    pub const SIZE: usize = 32;

    #[must_use]
    pub const fn bow_type(&self) -> Option<BowType> {
        BowType::from_u8(self.bow)
    }

    #[must_use]
    pub const fn boomerang_type(&self) -> Option<BoomerangType> {
        BoomerangType::from_u8(self.boomerang)
    }

    #[must_use]
    pub const fn magic_type(&self) -> Option<MagicType> {
        MagicType::from_u8(self.magic)
    }

    #[must_use]
    pub const fn armor_type(&self) -> Option<ArmorType> {
        ArmorType::from_u8(self.armor)
    }

    #[must_use]
    pub fn bottle(&self, index: usize) -> Option<BottleType> {
        self.bottle_types.get(index).copied().and_then(BottleType::from_u8)
    }

    fn from_raw(raw: [u8; Self::SIZE]) -> Self {
        let [
            bow,
            boomerang,
            hookshot,
            bombs,
            magic,
            fire_rod,
            ice_rod,
            bombos,
            ether,
            quake,
            torch,
            hammer,
            flute,
            bug_net,
            book,
            bottles,
            somaria,
            byrna,
            magic_cape,
            magic_mirror,
            gloves,
            boots,
            flippers,
            moon_pearl,
            unused,
            sword,
            shield,
            armor,
            b0,
            b1,
            b2,
            b3,
        ] = raw;
        Self {
            bow,
            boomerang,
            hookshot,
            bombs,
            magic,
            fire_rod,
            ice_rod,
            bombos,
            ether,
            quake,
            torch,
            hammer,
            flute,
            bug_net,
            book,
            bottles,
            somaria,
            byrna,
            magic_cape,
            magic_mirror,
            gloves,
            boots,
            flippers,
            moon_pearl,
            unused,
            sword,
            shield,
            armor,
            bottle_types: [b0, b1, b2, b3],
        }
    }

    const fn to_raw(&self) -> [u8; Self::SIZE] {
        let [b0, b1, b2, b3] = self.bottle_types;
        [
            self.bow,
            self.boomerang,
            self.hookshot,
            self.bombs,
            self.magic,
            self.fire_rod,
            self.ice_rod,
            self.bombos,
            self.ether,
            self.quake,
            self.torch,
            self.hammer,
            self.flute,
            self.bug_net,
            self.book,
            self.bottles,
            self.somaria,
            self.byrna,
            self.magic_cape,
            self.magic_mirror,
            self.gloves,
            self.boots,
            self.flippers,
            self.moon_pearl,
            self.unused,
            self.sword,
            self.shield,
            self.armor,
            b0,
            b1,
            b2,
            b3,
        ]
    }

    fn read<R: Reader>(reader: &mut R) -> Result<Self, StreamError> {
        let mut raw = [0u8; Self::SIZE];
        reader.read_exact_into(&mut raw)?;
        Ok(Self::from_raw(raw))
    }

    fn write<W: Writer>(&self, writer: &mut W) -> Result<(), StreamError> {
        writer.write_ubytes(&self.to_raw())
    }
}

// ============================================================================
// Quest
// ============================================================================

/// Decoded contents of one save slot. Reserved gaps are not kept and are
/// written back as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quest {
    pub room_flags: Vec<RoomFlags>,
    pub overworld_events: Vec<OverworldEvent>,
    pub inventory: Inventory,
    pub rupee_max: u16,
    pub rupee_current: u16,
    pub compasses: DungeonItemFlags,
    pub big_keys: DungeonItemFlags,
    pub dungeon_maps: DungeonItemFlags,
    pub wishing_pond: u16,
    pub health_max: u8,
    pub health: u8,
    pub magic_power: u8,
    pub keys: u8,
    pub bomb_upgrades: u8,
    pub arrow_upgrades: u8,
    pub health_filler: u8,
    pub magic_filler: u8,
    pub pendants: Pendants,
    pub bomb_filler: u8,
    pub arrow_filler: u8,
    pub arrows: u8,
    pub abilities: Abilities,
    pub crystals: Crystals,
    pub magic_usage: MagicUsage,
    pub dungeon_keys: [u8; DUNGEON_KEY_COUNT],
    pub progress_indicator: u8,
    pub progress_flags1: ProgressFlags1,
    pub map_icon: u8,
    pub start_location: u8,
    pub progress_flags2: ProgressFlags2,
    pub light_dark_world: LightDarkWorld,
    pub tag_along: u8,
    pub old_man_flags: [u8; OLD_MAN_FLAG_COUNT],
    pub bomb_flag: u8,
    pub unknown1: [u8; UNKNOWN1_COUNT],
    /// Name as raw font tile indices.
    pub player_name: [u16; NAME_LENGTH],
    pub valid: bool,
    pub dungeon_death_totals: [u16; DUNGEON_COUNT],
    pub unknown2: u16,
    pub death_save_count: u16,
    pub post_game_death_counter: i16,
    /// Checksum as read from the file; recomputed on write.
    pub checksum: u16,
}

impl Default for Quest {
    fn default() -> Self {
        Self {
            room_flags: vec![RoomFlags::default(); ROOM_COUNT],
            overworld_events: vec![OverworldEvent::default(); OVERWORLD_AREA_COUNT],
            inventory: Inventory::default(),
            rupee_max: 0,
            rupee_current: 0,
            compasses: DungeonItemFlags::default(),
            big_keys: DungeonItemFlags::default(),
            dungeon_maps: DungeonItemFlags::default(),
            wishing_pond: 0,
            health_max: 0,
            health: 0,
            magic_power: 0,
            keys: 0,
            bomb_upgrades: 0,
            arrow_upgrades: 0,
            health_filler: 0,
            magic_filler: 0,
            pendants: Pendants::default(),
            bomb_filler: 0,
            arrow_filler: 0,
            arrows: 0,
            abilities: Abilities::default(),
            crystals: Crystals::default(),
            magic_usage: MagicUsage::default(),
            dungeon_keys: [0; DUNGEON_KEY_COUNT],
            progress_indicator: 0,
            progress_flags1: ProgressFlags1::default(),
            map_icon: 0,
            start_location: 0,
            progress_flags2: ProgressFlags2::default(),
            light_dark_world: LightDarkWorld::default(),
            tag_along: 0,
            old_man_flags: [0; OLD_MAN_FLAG_COUNT],
            bomb_flag: 0,
            unknown1: [0; UNKNOWN1_COUNT],
            player_name: [NAME_BLANK; NAME_LENGTH],
            valid: false,
            dungeon_death_totals: [0; DUNGEON_COUNT],
            unknown2: 0,
            death_save_count: 0,
            post_game_death_counter: 0,
            checksum: 0,
        }
    }
}

fn read_array<R: Reader, const N: usize>(reader: &mut R) -> Result<[u8; N], StreamError> {
    let mut out = [0u8; N];
    reader.read_exact_into(&mut out)?;
    Ok(out)
}

fn read_u16_array<R: Reader, const N: usize>(reader: &mut R) -> Result<[u16; N], StreamError> {
    let mut out = [0u16; N];
    for value in &mut out {
        *value = reader.read_u16_little()?;
    }
    Ok(out)
}

impl Quest {
    #[must_use]
    pub const fn progress(&self) -> Option<ProgressIndicator> {
        ProgressIndicator::from_u8(self.progress_indicator)
    }

    #[must_use]
    pub const fn map_icon_kind(&self) -> Option<MapIcon> {
        MapIcon::from_u8(self.map_icon)
    }

    #[must_use]
    pub const fn start_location_kind(&self) -> Option<StartLocation> {
        StartLocation::from_u8(self.start_location)
    }

    #[must_use]
    pub const fn tag_along_kind(&self) -> Option<TagAlong> {
        TagAlong::from_u8(self.tag_along)
    }

    /// Reads one slot starting at the reader's cursor.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnexpectedEof`] if the slot is cut short.
    pub fn read<R: Reader>(reader: &mut R) -> Result<Self, StreamError> {
        let base = reader.position();
        let at = |offset: u64| i64::try_from(base + offset).unwrap_or(i64::MAX);

        let room_flags =
            reader.enumerate(ROOM_COUNT, |r| r.read_u16_little().map(RoomFlags::from_bits))?;
        let overworld_events =
            reader.enumerate(OVERWORLD_AREA_COUNT, |r| r.read_u8().map(OverworldEvent::from_bits))?;
        let inventory = Inventory::read(reader)?;
        let rupee_max = reader.read_u16_little()?;
        let rupee_current = reader.read_u16_little()?;
        let compasses = DungeonItemFlags::from_bits(reader.read_u16_little()?);
        let big_keys = DungeonItemFlags::from_bits(reader.read_u16_little()?);
        let dungeon_maps = DungeonItemFlags::from_bits(reader.read_u16_little()?);
        let wishing_pond = reader.read_u16_little()?;
        let [
            health_max,
            health,
            magic_power,
            keys,
            bomb_upgrades,
            arrow_upgrades,
            health_filler,
            magic_filler,
        ] = read_array::<_, 8>(reader)?;
        let pendants = Pendants::from_bits(reader.read_u8()?);
        let [bomb_filler, arrow_filler, arrows] = read_array::<_, 3>(reader)?;

        reader.seek(at(0x379), SeekOrigin::Begin)?;
        let abilities = Abilities::from_bits(reader.read_u8()?);
        let crystals = Crystals::from_bits(reader.read_u8()?);
        let magic_usage = MagicUsage::from_bits(reader.read_u8()?);
        let dungeon_keys = read_array::<_, DUNGEON_KEY_COUNT>(reader)?;

        reader.seek(at(0x3C5), SeekOrigin::Begin)?;
        let progress_indicator = reader.read_u8()?;
        let progress_flags1 = ProgressFlags1::from_bits(reader.read_u8()?);
        let map_icon = reader.read_u8()?;
        let start_location = reader.read_u8()?;
        let progress_flags2 = ProgressFlags2::from_bits(reader.read_u8()?);
        let light_dark_world = LightDarkWorld::from_bits(reader.read_u8()?);

        reader.seek(at(0x3CC), SeekOrigin::Begin)?;
        let tag_along = reader.read_u8()?;
        let old_man_flags = read_array::<_, OLD_MAN_FLAG_COUNT>(reader)?;
        let bomb_flag = reader.read_u8()?;
        let unknown1 = read_array::<_, UNKNOWN1_COUNT>(reader)?;
        let player_name = read_u16_array::<_, NAME_LENGTH>(reader)?;
        let valid = reader.read_u16_little()? == VALID_MARKER;
        let dungeon_death_totals = read_u16_array::<_, DUNGEON_COUNT>(reader)?;
        let unknown2 = reader.read_u16_little()?;
        let death_save_count = reader.read_u16_little()?;
        let post_game_death_counter = reader.read_i16_little()?;

        reader.seek(at(CHECKSUM_OFFSET), SeekOrigin::Begin)?;
        let checksum = reader.read_u16_little()?;

        Ok(Self {
            room_flags,
            overworld_events,
            inventory,
            rupee_max,
            rupee_current,
            compasses,
            big_keys,
            dungeon_maps,
            wishing_pond,
            health_max,
            health,
            magic_power,
            keys,
            bomb_upgrades,
            arrow_upgrades,
            health_filler,
            magic_filler,
            pendants,
            bomb_filler,
            arrow_filler,
            arrows,
            abilities,
            crystals,
            magic_usage,
            dungeon_keys,
            progress_indicator,
            progress_flags1,
            map_icon,
            start_location,
            progress_flags2,
            light_dark_world,
            tag_along,
            old_man_flags,
            bomb_flag,
            unknown1,
            player_name,
            valid,
            dungeon_death_totals,
            unknown2,
            death_save_count,
            post_game_death_counter,
            checksum,
        })
    }

    /// Writes the slot body (everything before the checksum) at the
    /// writer's cursor, zero-filling the reserved gaps. The cursor ends at
    /// the checksum offset.
    ///
    /// # Errors
    ///
    /// Propagates writer errors.
    pub fn write_body<W: Writer>(&self, writer: &mut W) -> Result<(), StreamError> {
        let base = writer.position();

        for flags in self
            .room_flags
            .iter()
            .copied()
            .chain(std::iter::repeat(RoomFlags::default()))
            .take(ROOM_COUNT)
        {
            writer.write_u16_little(flags.bits())?;
        }
        for event in self
            .overworld_events
            .iter()
            .copied()
            .chain(std::iter::repeat(OverworldEvent::default()))
            .take(OVERWORLD_AREA_COUNT)
        {
            writer.write_u8(event.bits())?;
        }
        self.inventory.write(writer)?;
        writer.write_u16_little(self.rupee_max)?;
        writer.write_u16_little(self.rupee_current)?;
        writer.write_u16_little(self.compasses.bits())?;
        writer.write_u16_little(self.big_keys.bits())?;
        writer.write_u16_little(self.dungeon_maps.bits())?;
        writer.write_u16_little(self.wishing_pond)?;
        writer.write_ubytes(&[
            self.health_max,
            self.health,
            self.magic_power,
            self.keys,
            self.bomb_upgrades,
            self.arrow_upgrades,
            self.health_filler,
            self.magic_filler,
        ])?;
        writer.write_u8(self.pendants.bits())?;
        writer.write_ubytes(&[self.bomb_filler, self.arrow_filler, self.arrows])?;

        writer.write_zero_to(base + 0x379)?;
        writer.write_u8(self.abilities.bits())?;
        writer.write_u8(self.crystals.bits())?;
        writer.write_u8(self.magic_usage.bits())?;
        writer.write_ubytes(&self.dungeon_keys)?;

        writer.write_zero_to(base + 0x3C5)?;
        writer.write_u8(self.progress_indicator)?;
        writer.write_u8(self.progress_flags1.bits())?;
        writer.write_u8(self.map_icon)?;
        writer.write_u8(self.start_location)?;
        writer.write_u8(self.progress_flags2.bits())?;
        writer.write_u8(self.light_dark_world.bits())?;

        writer.write_zero_to(base + 0x3CC)?;
        writer.write_u8(self.tag_along)?;
        writer.write_ubytes(&self.old_man_flags)?;
        writer.write_u8(self.bomb_flag)?;
        writer.write_ubytes(&self.unknown1)?;
        for unit in self.player_name {
            writer.write_u16_little(unit)?;
        }
        writer.write_u16_little(if self.valid { VALID_MARKER } else { 0 })?;
        for total in self.dungeon_death_totals {
            writer.write_u16_little(total)?;
        }
        writer.write_u16_little(self.unknown2)?;
        writer.write_u16_little(self.death_save_count)?;
        writer.write_i16_little(self.post_game_death_counter)?;

        writer.write_zero_to(base + CHECKSUM_OFFSET)
    }

    /// Decodes [`Quest::player_name`] into text.
    #[must_use]
    pub fn player_name_string(&self) -> String {
        self.player_name.iter().filter_map(|&tile| decode_name_tile(tile)).collect()
    }

    /// Encodes `name` into font tiles, padding with blanks.
    ///
    /// Names longer than six characters are truncated; characters without a
    /// tile become blanks.
    pub fn set_player_name(&mut self, name: &str) {
        let count = name.chars().count();
        if count > NAME_LENGTH {
            warn!(player_name = name, "player name longer than {NAME_LENGTH} characters, truncating");
        }
        let mut tiles = [NAME_BLANK; NAME_LENGTH];
        for (slot, ch) in tiles.iter_mut().zip(name.chars()) {
            *slot = encode_name_char(ch).unwrap_or_else(|| {
                warn!(%ch, "no name tile for character");
                NAME_BLANK
            });
        }
        self.player_name = tiles;
    }
}

fn encode_name_char(ch: char) -> Option<u16> {
    let offset = |base: char| u16::try_from(u32::from(ch) - u32::from(base)).ok();
    match ch {
        'I' => Some(0xAF),
        'A'..='P' => offset('A'),
        'Q'..='Z' => offset('Q').map(|v| v + 0x20),
        'a'..='f' => offset('a').map(|v| v + 0x2A),
        'k' => Some(0x42),
        'i' => Some(0x44),
        'g'..='v' => offset('g').map(|v| v + 0x40),
        'w'..='z' => offset('w').map(|v| v + 0x60),
        '0'..='9' => offset('0').map(|v| v + 0x64),
        '-' => Some(0x80),
        '.' => Some(0x81),
        '?' => Some(0x6E),
        '!' => Some(0x6F),
        ',' => Some(0x82),
        '(' => Some(0x85),
        ')' => Some(0x86),
        _ => None,
    }
}

fn decode_name_tile(tile: u16) -> Option<char> {
    let shifted = |base: u8, delta: u16| u8::try_from(delta).ok().map(|d| char::from(base + d));
    match tile {
        0x00..=0x0F => shifted(b'A', tile),
        0x20..=0x29 => shifted(b'Q', tile - 0x20),
        0x2A..=0x2F => shifted(b'a', tile - 0x2A),
        0x42 => Some('k'),
        0x44 => Some('i'),
        0x40..=0x4F => shifted(b'g', tile - 0x40),
        0x60..=0x63 => shifted(b'w', tile - 0x60),
        0x64..=0x6D => shifted(b'0', tile - 0x64),
        0x6E => Some('?'),
        0x6F => Some('!'),
        0x80 => Some('-'),
        0x81 => Some('.'),
        0x82 => Some(','),
        0x85 => Some('('),
        0x86 => Some(')'),
        0xAF => Some('I'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{MemoryReader, Stream, VectorWriter};

    #[test]
    fn body_fills_slot_up_to_checksum() {
        let mut w = VectorWriter::new();
        Quest::default().write_body(&mut w).unwrap();
        assert_eq!(w.length(), CHECKSUM_OFFSET);
    }

    #[test]
    fn fields_land_at_documented_offsets() {
        let mut quest = Quest::default();
        quest.rupee_current = 0x1234;
        quest.arrows = 0x1E;
        quest.progress_indicator = 3;
        quest.tag_along = 1;
        quest.valid = true;
        quest.post_game_death_counter = -2;
        quest.compasses.misery_mire = true;

        let mut w = VectorWriter::new();
        quest.write_body(&mut w).unwrap();
        let data = w.data();
        assert_eq!(&data[0x362..0x364], &[0x34, 0x12]);
        assert_eq!(&data[0x364..0x366], &[0x00, 0x01]);
        assert_eq!(data[0x377], 0x1E);
        assert_eq!(data[0x3C5], 3);
        assert_eq!(data[0x3CC], 1);
        assert_eq!(&data[0x3E5..0x3E7], &[0xAA, 0x55]);
        assert_eq!(&data[0x405..0x407], &[0xFE, 0xFF]);
    }

    #[test]
    fn write_then_read_preserves_fields() {
        let mut quest = Quest::default();
        quest.room_flags[3].boss_battle_won = true;
        quest.overworld_events[10].heart_piece = true;
        quest.inventory.bow = 2;
        quest.inventory.bottle_types = [5, 0, 2, 7];
        quest.dungeon_keys[4] = 9;
        quest.set_player_name("LINK");

        let mut w = VectorWriter::new();
        quest.write_body(&mut w).unwrap();
        w.write_u16_little(0xBEEF).unwrap();

        let mut r = MemoryReader::new(w.into_inner());
        let read = Quest::read(&mut r).unwrap();
        assert_eq!(read.checksum, 0xBEEF);
        assert_eq!(read.inventory.bow_type(), Some(BowType::SilverArrows));
        assert_eq!(read.inventory.bottle(0), Some(BottleType::Fairy));
        assert_eq!(read.player_name_string(), "LINK");
        quest.checksum = 0xBEEF;
        assert_eq!(read, quest);
    }

    #[test]
    fn name_tiles_round_trip() {
        let mut quest = Quest::default();
        quest.set_player_name("Ik-9?");
        assert_eq!(quest.player_name, [0xAF, 0x42, 0x80, 0x6D, 0x6E, NAME_BLANK]);
        assert_eq!(quest.player_name_string(), "Ik-9?");
    }

    #[test]
    fn long_names_are_truncated() {
        let mut quest = Quest::default();
        quest.set_player_name("GANONDORF");
        assert_eq!(quest.player_name_string(), "GANOND");
    }
}
