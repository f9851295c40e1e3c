//! Bit-packed flag records. Every field maps to one bit, least significant
//! bit first; multi-byte records are little-endian so the second byte holds
//! bits 8..16.

use serde::Serialize;

macro_rules! bit_flags {
    ($(
        $(#[$meta:meta])*
        $name:ident: $repr:ty { $($field:ident),+ $(,)? }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
            pub struct $name {
                $(pub $field: bool,)+
            }

            impl $name {
                /// Unpacks the record, least significant bit first.
                #[must_use]
                #[allow(unused_assignments)]
                pub const fn from_bits(bits: $repr) -> Self {
                    let mut shift = 0u32;
                    $(
                        let $field = (bits >> shift) & 1 == 1;
                        shift += 1;
                    )+
                    Self { $($field,)+ }
                }

                /// Packs the record back into its raw form.
                #[must_use]
                #[allow(unused_assignments)]
                pub const fn bits(self) -> $repr {
                    let mut bits: $repr = 0;
                    let mut shift = 0u32;
                    $(
                        if self.$field {
                            bits |= 1 << shift;
                        }
                        shift += 1;
                    )+
                    bits
                }
            }
        )*
    };
}

bit_flags! {
    /// Per-room state, two bytes.
    RoomFlags: u16 {
        chest1, chest2, chest3, chest4,
        quadrant1, quadrant2, quadrant3, quadrant4,
        door1, door2, door3, door4,
        boss_battle_won, key, key_or_chest, chest_or_tile,
    }

    /// Per-area overworld state.
    OverworldEvent: u8 {
        unused1, heart_piece, overlay, unused2, unused3, unused4, set, unused5,
    }

    /// Which dungeons a compass, big key or map has been found for.
    DungeonItemFlags: u16 {
        unused1, unused2, ganons_tower, turtle_rock,
        gargoyles_domain, tower_of_hera, ice_palace, skull_woods,
        misery_mire, dark_palace, swamp_palace, hyrule_castle2,
        desert_palace, eastern_palace, hyrule_castle, sewer_passage,
    }

    Pendants: u8 {
        courage, wisdom, power, unused1, unused2, unused3, unused4, unused5,
    }

    Abilities: u8 {
        nothing, swim, dash, pull, unknown1, talk, read, unknown2,
    }

    Crystals: u8 {
        misery_mire, dark_palace, ice_palace, turtle_rock,
        swamp_palace, gargoyles_domain, skull_woods, unused,
    }

    MagicUsage: u8 {
        normal, half, quarter, unused1, unused2, unused3, unused4, unused5,
    }

    ProgressFlags1: u8 {
        uncle_secret_passage, dying_priest, zelda_sanctuary, unused1,
        uncle_left_house, book_of_mudora, dwarf_partner, unused2,
    }

    ProgressFlags2: u8 {
        bottle_from_bum, bottle_from_salesman, unused1, flute_boy,
        thiefs_chest, saved_smith_partner, unused2, smiths_have_sword,
    }

    LightDarkWorld: u8 {
        unused1, unused2, unused3, unused4, unused5, unused6, is_dark_world, unused7,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dungeon_flags_bit_order() {
        let flags = DungeonItemFlags::from_bits(0x0104);
        assert!(flags.ganons_tower);
        assert!(flags.misery_mire);
        assert!(!flags.skull_woods);
        assert_eq!(flags.bits(), 0x0104);
    }

    #[test]
    fn second_byte_ends_with_sewer_passage() {
        let flags = DungeonItemFlags {
            sewer_passage: true,
            unused1: true,
            ..DungeonItemFlags::default()
        };
        assert_eq!(flags.bits().to_le_bytes(), [0x01, 0x80]);
    }

    #[test]
    fn every_byte_value_round_trips() {
        for raw in 0..=u8::MAX {
            assert_eq!(Abilities::from_bits(raw).bits(), raw);
            assert_eq!(Crystals::from_bits(raw).bits(), raw);
        }
    }

    #[test]
    fn room_flags_split_across_bytes() {
        let flags = RoomFlags::from_bits(u16::from_le_bytes([0x01, 0x10]));
        assert!(flags.chest1);
        assert!(flags.boss_battle_won);
        assert!(!flags.door1);
    }
}
