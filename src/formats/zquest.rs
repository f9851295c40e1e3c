//! ZQuest: a small container wrapping a game save payload.
//!
//! Header (all little-endian): magic, version, stored length, uncompressed
//! length, then for 2.0.0 and later a 10-byte game string, a byte-order
//! mark and the CRC-32 of the stored payload. Older files carry a game
//! index and ten unused bytes instead. When the two lengths differ the
//! payload is zlib-compressed.

use serde::Serialize;
use tracing::{debug, warn};

use crate::checksums::crc32_default;
use crate::compression::{compress_zlib, decompress_zlib};
use crate::error::FormatError;
use crate::io::{Endian, MemoryReader, Reader, SeekOrigin, VectorWriter, Writer};

/// Builds a packed version number.
#[must_use]
pub const fn version(major: u32, minor: u32, revision: u32) -> u32 {
    major | (minor << 8) | (revision << 16)
}

pub const VERSION_MAJOR: u32 = 2;
pub const VERSION_MINOR: u32 = 0;
pub const VERSION_REVISION: u32 = 0;
pub const VERSION: u32 = version(VERSION_MAJOR, VERSION_MINOR, VERSION_REVISION);

/// `ZQS2` read as a little-endian word.
pub const MAGIC: u32 = u32::from_le_bytes(*b"ZQS2");
const MAGIC_MASK: u32 = 0x00FF_FFFF;

pub const GAME_STRING_LENGTH: usize = 0x0A;

const BOM_BIG: u16 = 0xFEFF;
const BOM_LITTLE: u16 = 0xFFFE;

macro_rules! games {
    ($($variant:ident => $name:literal,)+) => {
        /// Games a payload can belong to, in on-disk index order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum Game {
            $($variant,)+
        }

        impl Game {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Display name, also the source of the header game string.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }
    };
}

games! {
    NoGame => "No Game",
    LegendOfZelda => "Legend Of Zelda",
    AdventureOfLink => "Adventure of Link",
    ALinkToThePast => "A Link to the Past",
    LinksAwakening => "Links Awakening",
    OcarinaOfTime => "Ocarina of Time",
    OcarinaOfTime3D => "Ocarina of Time 3D",
    MajorasMask => "Majora's Mask",
    OracleOfSeasons => "Oracle of Seasons",
    OracleOfAges => "Oracle of Ages",
    FourSwords => "For Swords",
    WindWaker => "Wind Waker",
    FourSwordsAdventures => "Four Swords Adventures",
    MinishCap => "Minish Cap",
    TwilightPrincess => "Twilight Princess",
    PhantomHourglass => "Phantom Hourglass",
    SpiritTracks => "Spirit Tracks",
    SkywardSword => "Skyward Sword",
    ALinkBetweenWorlds => "A Link Between Worlds",
}

impl Game {
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }

    /// Matches a header game string against the first ten bytes of each
    /// game name. The first match wins.
    #[must_use]
    pub fn from_game_string(text: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|game| {
            let name = game.name().as_bytes();
            &name[..name.len().min(GAME_STRING_LENGTH)] == text.as_bytes()
        })
    }
}

/// A decoded ZQuest container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZQuestFile {
    pub game: Game,
    /// Game string as stored. Unknown strings are kept here verbatim.
    pub game_string: String,
    /// Byte order of the payload, recorded by the byte-order mark.
    pub endian: Endian,
    pub data: Vec<u8>,
}

impl Default for ZQuestFile {
    fn default() -> Self {
        Self::new(Game::NoGame, Endian::Little, Vec::new())
    }
}

impl ZQuestFile {
    #[must_use]
    pub fn new(game: Game, endian: Endian, data: Vec<u8>) -> Self {
        Self {
            game,
            game_string: game.name().to_string(),
            endian,
            data,
        }
    }

    /// Sets the game and its game string together.
    pub fn set_game(&mut self, game: Game) {
        self.game = game;
        self.game_string = game.name().to_string();
    }

    #[must_use]
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Decodes a container.
    ///
    /// # Errors
    ///
    /// - [`FormatError::BadMagic`] if the low 24 bits of the magic differ.
    /// - [`FormatError::UnsupportedVersion`] for a version newer than 2.0.0.
    /// - [`FormatError::ChecksumMismatch`] if the payload CRC-32 differs.
    /// - [`FormatError::Compression`] if the payload does not inflate to the
    ///   declared length.
    pub fn read<R: Reader>(reader: &mut R) -> Result<Self, FormatError> {
        reader.set_endian(Endian::Little);

        let magic = reader.read_u32()?;
        if magic & MAGIC_MASK != MAGIC & MAGIC_MASK {
            return Err(FormatError::BadMagic {
                format: "ZQuest",
                found: magic,
            });
        }

        let file_version = reader.read_u32()?;
        if file_version > VERSION {
            return Err(FormatError::UnsupportedVersion {
                format: "ZQuest",
                version: file_version,
            });
        }

        let stored_len = read_len(reader)?;
        let uncompressed_len = read_len(reader)?;

        let (game, game_string, bom, checksum) = if file_version >= version(2, 0, 0) {
            let game_string = reader.read_string(Some(GAME_STRING_LENGTH))?;
            let game = Game::from_game_string(&game_string);
            let bom = reader.read_u16()?;
            let checksum = reader.read_u32()?;
            match game {
                Some(game) => (game, game.name().to_string(), bom, Some(checksum)),
                None => (Game::NoGame, game_string, bom, Some(checksum)),
            }
        } else {
            let index = reader.read_u32()?;
            let game = Game::from_index(index).unwrap_or(Game::NoGame);
            let bom = reader.read_u16()?;
            reader.seek(0x0A, SeekOrigin::Current)?;
            (game, game.name().to_string(), bom, None)
        };

        let stored = reader.read_ubytes(stored_len)?;

        match checksum {
            Some(expected) => {
                let computed = crc32_default(&stored);
                if computed != expected {
                    return Err(FormatError::ChecksumMismatch {
                        what: "ZQuest payload",
                        stored: u64::from(expected),
                        computed: u64::from(computed),
                    });
                }
            }
            None => warn!(
                version = format_args!("{file_version:#010x}"),
                "ZQuest version has no checksum field"
            ),
        }

        let data = if stored_len == uncompressed_len {
            stored
        } else {
            debug!(stored_len, uncompressed_len, "inflating ZQuest payload");
            decompress_zlib(&stored, Some(uncompressed_len))?
        };

        Ok(Self {
            game,
            game_string,
            endian: if bom == BOM_BIG { Endian::Big } else { Endian::Little },
            data,
        })
    }

    /// # Errors
    ///
    /// See [`ZQuestFile::read`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        Self::read(&mut MemoryReader::new(data))
    }

    /// Encodes the container at the current version.
    ///
    /// With `compress`, the payload is deflated and kept only if that makes
    /// it smaller; otherwise it is stored raw.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidData`] if the payload exceeds 4 GiB and
    /// propagates writer errors.
    pub fn write<W: Writer>(&self, writer: &mut W, compress: bool) -> Result<(), FormatError> {
        let raw_len = len_u32(self.data.len())?;
        let packed = if compress {
            match compress_zlib(&self.data) {
                Ok(packed) if packed.len() < self.data.len() => Some(packed),
                Ok(packed) => {
                    debug!(
                        packed = packed.len(),
                        raw = self.data.len(),
                        "compressed payload is not smaller, storing raw"
                    );
                    None
                }
                Err(err) => {
                    warn!(error = %err, "zlib compression failed, storing raw");
                    None
                }
            }
        } else {
            None
        };
        let stored = packed.as_deref().unwrap_or(&self.data);

        writer.set_endian(Endian::Little);
        writer.write_u32(MAGIC)?;
        writer.write_u32(VERSION)?;
        writer.write_u32(len_u32(stored.len())?)?;
        writer.write_u32(raw_len)?;
        writer.write_string(&self.game_string, Some(GAME_STRING_LENGTH))?;
        writer.write_u16(if self.endian == Endian::Big { BOM_BIG } else { BOM_LITTLE })?;
        writer.write_u32(crc32_default(stored))?;
        writer.write_ubytes(stored)?;
        Ok(())
    }

    /// # Errors
    ///
    /// See [`ZQuestFile::write`].
    pub fn to_bytes(&self, compress: bool) -> Result<Vec<u8>, FormatError> {
        let mut writer = VectorWriter::new();
        self.write(&mut writer, compress)?;
        Ok(writer.into_inner())
    }

    #[must_use]
    pub fn summary(&self) -> ZQuestSummary {
        ZQuestSummary {
            game: self.game,
            game_string: self.game_string.clone(),
            endian: self.endian,
            length: self.data.len(),
            crc32: crc32_default(&self.data),
        }
    }
}

fn read_len<R: Reader>(reader: &mut R) -> Result<usize, FormatError> {
    let len = reader.read_u32()?;
    usize::try_from(len).map_err(|_| FormatError::InvalidData(format!("length {len} too large")))
}

fn len_u32(len: usize) -> Result<u32, FormatError> {
    u32::try_from(len)
        .map_err(|_| FormatError::InvalidData(format!("payload of {len} bytes is too large")))
}

#[derive(Debug, Clone, Serialize)]
pub struct ZQuestSummary {
    pub game: Game,
    pub game_string: String,
    pub endian: Endian,
    pub length: usize,
    /// CRC-32 of the decoded payload.
    pub crc32: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompressionError;

    fn payload() -> Vec<u8> {
        b"quest data ".iter().copied().cycle().take(512).collect()
    }

    #[test]
    fn header_layout() {
        let file = ZQuestFile::new(Game::SkywardSword, Endian::Big, vec![1, 2, 3, 4]);
        let bytes = file.to_bytes(false).unwrap();
        assert_eq!(&bytes[..4], b"ZQS2");
        assert_eq!(&bytes[4..8], &[2, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[4, 0, 0, 0]);
        assert_eq!(&bytes[12..16], &[4, 0, 0, 0]);
        assert_eq!(&bytes[16..26], b"Skyward Sw");
        assert_eq!(&bytes[26..28], &0xFEFFu16.to_le_bytes());
        assert_eq!(bytes.len(), 32 + 4);
    }

    #[test]
    fn compressed_round_trip() {
        let file = ZQuestFile::new(Game::MinishCap, Endian::Little, payload());
        let bytes = file.to_bytes(true).unwrap();
        assert!(bytes.len() < 32 + 512);

        let read = ZQuestFile::from_bytes(&bytes).unwrap();
        assert_eq!(read, file);
    }

    #[test]
    fn incompressible_payload_is_stored_raw() {
        let file = ZQuestFile::new(Game::WindWaker, Endian::Little, vec![0x5A]);
        let bytes = file.to_bytes(true).unwrap();
        assert_eq!(&bytes[8..12], &bytes[12..16]);
        assert_eq!(ZQuestFile::from_bytes(&bytes).unwrap().data, vec![0x5A]);
    }

    #[test]
    fn game_string_matches_prefix() {
        assert_eq!(Game::from_game_string("A Link Bet"), Some(Game::ALinkBetweenWorlds));
        assert_eq!(Game::from_game_string("No Game"), Some(Game::NoGame));
        assert_eq!(Game::from_game_string("Metroid"), None);
    }

    #[test]
    fn unknown_game_string_is_kept() {
        let mut file = ZQuestFile::new(Game::NoGame, Endian::Little, vec![9; 8]);
        file.game_string = "Metroid".to_string();
        let read = ZQuestFile::from_bytes(&file.to_bytes(false).unwrap()).unwrap();
        assert_eq!(read.game, Game::NoGame);
        assert_eq!(read.game_string, "Metroid");
    }

    #[test]
    fn corrupted_payload_fails_checksum() {
        let file = ZQuestFile::new(Game::OcarinaOfTime, Endian::Little, payload());
        let mut bytes = file.to_bytes(false).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        assert!(matches!(
            ZQuestFile::from_bytes(&bytes),
            Err(FormatError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut bytes = ZQuestFile::default().to_bytes(false).unwrap();
        bytes[4] = 3;
        assert!(matches!(
            ZQuestFile::from_bytes(&bytes),
            Err(FormatError::UnsupportedVersion { version: 3, .. })
        ));
    }

    #[test]
    fn magic_checks_low_24_bits_only() {
        let mut bytes = ZQuestFile::default().to_bytes(false).unwrap();
        bytes[3] = b'1';
        assert!(ZQuestFile::from_bytes(&bytes).is_ok());
        bytes[0] = b'X';
        assert!(matches!(
            ZQuestFile::from_bytes(&bytes),
            Err(FormatError::BadMagic { .. })
        ));
    }

    #[test]
    fn old_version_has_game_index_and_no_checksum() {
        let mut writer = VectorWriter::with_endian(Endian::Little);
        writer.write_u32(MAGIC).unwrap();
        writer.write_u32(version(1, 0, 0)).unwrap();
        writer.write_u32(3).unwrap();
        writer.write_u32(3).unwrap();
        writer.write_u32(5).unwrap();
        writer.write_u16(BOM_BIG).unwrap();
        writer.fill(0, 0x0A).unwrap();
        writer.write_ubytes(b"abc").unwrap();

        let read = ZQuestFile::from_bytes(writer.data()).unwrap();
        assert_eq!(read.game, Game::OcarinaOfTime);
        assert_eq!(read.endian, Endian::Big);
        assert_eq!(read.data, b"abc");
    }

    #[test]
    fn wrong_inflated_size_is_an_error() {
        let file = ZQuestFile::new(Game::MinishCap, Endian::Little, payload());
        let mut bytes = file.to_bytes(true).unwrap();
        bytes[12..16].copy_from_slice(&600u32.to_le_bytes());
        assert!(matches!(
            ZQuestFile::from_bytes(&bytes),
            Err(FormatError::Compression(CompressionError::SizeMismatch { .. }))
        ));
    }
}
