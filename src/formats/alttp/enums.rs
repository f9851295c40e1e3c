//! Enumerations stored as single raw bytes in the save.
//!
//! The file keeps the raw byte so unknown values survive a round trip; these
//! types give it a name when it is one the game defines.

use serde::Serialize;

macro_rules! byte_enum {
    ($(
        $(#[$meta:meta])*
        $name:ident { $($variant:ident = $value:literal),+ $(,)? }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
            #[repr(u8)]
            pub enum $name {
                $($variant = $value,)+
            }

            impl $name {
                /// Maps a raw byte to a known variant.
                #[must_use]
                pub const fn from_u8(raw: u8) -> Option<Self> {
                    match raw {
                        $($value => Some(Self::$variant),)+
                        _ => None,
                    }
                }

                #[must_use]
                pub const fn as_u8(self) -> u8 {
                    self as u8
                }
            }
        )*
    };
}

byte_enum! {
    BowType { None = 0, Arrows = 1, SilverArrows = 2 }

    BoomerangType { None = 0, Blue = 1, Red = 2 }

    MagicType { None = 0, Mushroom = 1, Powder = 2 }

    ArmorType { GreenJerkin = 0, BlueMail = 1, RedMail = 2 }

    /// Bottle contents.
    BottleType {
        None = 0,
        Mushroom = 1,
        Empty = 2,
        RedPotion = 3,
        BluePotion = 4,
        Fairy = 5,
        Bee = 6,
        GoodBee = 7,
    }

    ProgressIndicator {
        LinkInBed = 0,
        InCastleWithSword = 1,
        CompletedFirstDungeon = 2,
        BeatenAghanim = 3,
    }

    /// Marker shown on the world map.
    MapIcon {
        Nothing = 0x00,
        CrossInKakariko = 0x01,
        CrossAtFirstDungeon = 0x02,
        Pendant = 0x03,
        MasterSword = 0x04,
        AghanimCastle = 0x05,
        Crystal1 = 0x06,
        AllCrystals = 0x07,
        AghanimGanonTower = 0x08,
    }

    StartLocation { LinksHouse = 0x00, Sanctuary = 0x01, Any = 0x05 }

    /// Character following Link.
    TagAlong {
        Noone = 0,
        Zelda = 1,
        Unknown1 = 2,
        OldMan = 3,
        ZeldaMessage = 4,
        Blind = 5,
        DwarfFrog = 6,
        DwarfLightWorld = 7,
        Kiki = 8,
        Unknown2 = 9,
        ThiefsChest = 10,
        AfterBoss = 11,
    }
}
