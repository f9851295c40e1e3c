//! Sakura sprite containers (`SPRS`).
//!
//! Little-endian throughout. The header records the texture count, canvas
//! size, origin and sprite count, followed by a reserved word. Textures come
//! next, then each sprite with its state ids and frames.

pub mod model;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::error::{FormatError, StreamError};
use crate::io::{Endian, MemoryReader, Reader, VectorWriter, Writer};

pub use model::{Sprite, SpriteFrame, SpritePart};

/// `SPRS` read as a little-endian word.
pub const MAGIC: u32 = u32::from_le_bytes(*b"SPRS");
/// Version 1.0.2, build 0.
pub const VERSION: u32 = 1 | (2 << 16);

const RESERVED: u32 = 0xFFFF_FFFF;

/// A texture referenced by sprite states.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Texture {
    pub path: String,
    pub preload: bool,
}

/// Canvas metadata plus textures and named sprites.
///
/// Sprites are keyed by their lower-cased name and keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpriteFile {
    pub size: [u32; 2],
    pub origin: [f32; 2],
    textures: Vec<Texture>,
    sprites: IndexMap<String, Sprite>,
}

impl SpriteFile {
    #[must_use]
    pub fn new(width: u32, height: u32, origin_x: f32, origin_y: f32) -> Self {
        Self {
            size: [width, height],
            origin: [origin_x, origin_y],
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.size[0]
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.size[1]
    }

    /// Appends a texture. Returns false once 65536 textures are present.
    pub fn add_texture(&mut self, texture: Texture) -> bool {
        if self.textures.len() >= model::MAX_ENTRIES {
            return false;
        }
        self.textures.push(texture);
        true
    }

    pub fn remove_texture(&mut self, index: usize) -> Option<Texture> {
        (index < self.textures.len()).then(|| self.textures.remove(index))
    }

    #[must_use]
    pub fn texture(&self, index: usize) -> Option<&Texture> {
        self.textures.get(index)
    }

    #[must_use]
    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Inserts a sprite under its lower-cased name, replacing any sprite
    /// already stored under that key in place.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidData`] if the sprite has no name.
    pub fn add_sprite(&mut self, sprite: Sprite) -> Result<(), FormatError> {
        if sprite.name().is_empty() {
            return Err(FormatError::InvalidData(
                "sprite names cannot be empty".to_string(),
            ));
        }
        let key = sprite.name().to_lowercase();
        if self.sprites.insert(key, sprite).is_some() {
            debug!("replaced sprite with the same name");
        }
        Ok(())
    }

    /// Looks a sprite up by name, ignoring case.
    #[must_use]
    pub fn sprite(&self, name: &str) -> Option<&Sprite> {
        self.sprites.get(&name.to_lowercase())
    }

    pub fn sprite_mut(&mut self, name: &str) -> Option<&mut Sprite> {
        self.sprites.get_mut(&name.to_lowercase())
    }

    /// Removes a sprite by name, ignoring case, preserving the order of the
    /// rest.
    pub fn remove_sprite(&mut self, name: &str) -> Option<Sprite> {
        self.sprites.shift_remove(&name.to_lowercase())
    }

    pub fn sprites(&self) -> impl Iterator<Item = &Sprite> {
        self.sprites.values()
    }

    #[must_use]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    // ========================================================================
    // Codec
    // ========================================================================

    /// Decodes a container.
    ///
    /// # Errors
    ///
    /// - [`FormatError::BadMagic`] or [`FormatError::UnsupportedVersion`] for
    ///   a foreign header.
    /// - [`FormatError::InvalidData`] for a sprite without a name.
    /// - Stream errors for truncated data.
    pub fn read<R: Reader>(reader: &mut R) -> Result<Self, FormatError> {
        reader.set_endian(Endian::Little);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(FormatError::BadMagic {
                format: "Sakura sprite",
                found: magic,
            });
        }
        let version = reader.read_u32()?;
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion {
                format: "Sakura sprite",
                version,
            });
        }

        let texture_count = reader.read_u16()?;
        let width = reader.read_u32()?;
        let height = reader.read_u32()?;
        let origin_x = reader.read_f32()?;
        let origin_y = reader.read_f32()?;
        let sprite_count = reader.read_u16()?;
        let _reserved = reader.read_u32()?;

        let mut file = Self::new(width, height, origin_x, origin_y);
        file.textures = reader.enumerate(usize::from(texture_count), |r| {
            Ok::<_, StreamError>(Texture {
                path: r.read_string(None)?,
                preload: r.read_bool()?,
            })
        })?;

        for _ in 0..sprite_count {
            let sprite = read_sprite(reader)?;
            file.add_sprite(sprite)?;
        }
        debug!(
            textures = file.texture_count(),
            sprites = file.sprite_count(),
            "read sprite container"
        );
        Ok(file)
    }

    /// # Errors
    ///
    /// See [`SpriteFile::read`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, FormatError> {
        Self::read(&mut MemoryReader::new(data))
    }

    /// Encodes the container.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidData`] when a count does not fit its
    /// u16 field, and propagates writer errors.
    pub fn write<W: Writer>(&self, writer: &mut W) -> Result<(), FormatError> {
        writer.set_endian(Endian::Little);
        writer.write_u32(MAGIC)?;
        writer.write_u32(VERSION)?;
        writer.write_u16(count_u16("texture", self.textures.len())?)?;
        writer.write_u32(self.width())?;
        writer.write_u32(self.height())?;
        writer.write_f32(self.origin[0])?;
        writer.write_f32(self.origin[1])?;
        writer.write_u16(count_u16("sprite", self.sprites.len())?)?;
        writer.write_u32(RESERVED)?;

        for texture in &self.textures {
            writer.write_string(&texture.path, None)?;
            writer.write_bool(texture.preload)?;
        }
        for sprite in self.sprites.values() {
            write_sprite(writer, sprite)?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`SpriteFile::write`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, FormatError> {
        let mut writer = VectorWriter::with_endian(Endian::Little);
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }
}

fn read_sprite<R: Reader>(reader: &mut R) -> Result<Sprite, FormatError> {
    let mut sprite = Sprite::new(reader.read_string(None)?);
    let frame_count = reader.read_u16()?;
    let state_count = reader.read_u16()?;
    sprite.set_state_ids(reader.enumerate(usize::from(state_count), Reader::read_u16)?);

    let frames = reader.enumerate(usize::from(frame_count), |r| {
        let mut frame = SpriteFrame::new(r.read_f32()?);
        let part_count = r.read_u16()?;
        frame.parts = r.enumerate(usize::from(part_count), read_part)?;
        Ok::<_, StreamError>(frame)
    })?;
    sprite.set_frames(frames);
    Ok(sprite)
}

fn read_part<R: Reader>(reader: &mut R) -> Result<SpritePart, StreamError> {
    Ok(SpritePart {
        name: reader.read_string(None)?,
        collision: reader.read_bool()?,
        offset: [reader.read_f32()?, reader.read_f32()?],
        texture_offset: [reader.read_f32()?, reader.read_f32()?],
        size: [reader.read_u32()?, reader.read_u32()?],
        flipped_horizontally: reader.read_bool()?,
        flipped_vertically: reader.read_bool()?,
    })
}

fn write_sprite<W: Writer>(writer: &mut W, sprite: &Sprite) -> Result<(), FormatError> {
    writer.write_string(sprite.name(), None)?;
    writer.write_u16(count_u16("frame", sprite.frame_count())?)?;
    writer.write_u16(count_u16("state", sprite.state_count())?)?;
    for &id in sprite.state_ids() {
        writer.write_u16(id)?;
    }

    for frame in sprite.frames() {
        writer.write_f32(frame.frame_time)?;
        writer.write_u16(count_u16("part", frame.part_count())?)?;
        for part in &frame.parts {
            writer.write_string(&part.name, None)?;
            writer.write_bool(part.collision)?;
            writer.write_f32(part.offset[0])?;
            writer.write_f32(part.offset[1])?;
            writer.write_f32(part.texture_offset[0])?;
            writer.write_f32(part.texture_offset[1])?;
            writer.write_u32(part.size[0])?;
            writer.write_u32(part.size[1])?;
            writer.write_bool(part.flipped_horizontally)?;
            writer.write_bool(part.flipped_vertically)?;
        }
    }
    Ok(())
}

fn count_u16(what: &str, count: usize) -> Result<u16, FormatError> {
    u16::try_from(count)
        .map_err(|_| FormatError::InvalidData(format!("too many {what} entries: {count}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SpriteFile {
        let mut file = SpriteFile::new(64, 32, 0.5, 1.0);
        file.add_texture(Texture {
            path: "link.png".to_string(),
            preload: true,
        });

        let mut walk = Sprite::new("Walk");
        walk.add_state_id(0);
        walk.add_state_id(2);
        let mut frame = SpriteFrame::new(0.25);
        frame.parts.push(SpritePart {
            name: "body".to_string(),
            collision: true,
            offset: [1.0, -2.0],
            texture_offset: [16.0, 0.0],
            size: [16, 24],
            flipped_horizontally: true,
            flipped_vertically: false,
        });
        walk.add_frame(frame);
        walk.add_frame(SpriteFrame::new(0.5));
        file.add_sprite(walk).unwrap();
        file.add_sprite(Sprite::new("idle")).unwrap();
        file
    }

    #[test]
    fn round_trip_keeps_order_and_fields() {
        let file = sample();
        let bytes = file.to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"SPRS");
        assert_eq!(&bytes[4..8], &[1, 0, 2, 0]);

        let read = SpriteFile::from_bytes(&bytes).unwrap();
        assert_eq!(read, file);
        let names: Vec<_> = read.sprites().map(Sprite::name).collect();
        assert_eq!(names, ["Walk", "idle"]);
    }

    #[test]
    fn header_fields() {
        let bytes = sample().to_bytes().unwrap();
        assert_eq!(u16::from_le_bytes([bytes[8], bytes[9]]), 1);
        assert_eq!(u32::from_le_bytes(bytes[10..14].try_into().unwrap()), 64);
        assert_eq!(u16::from_le_bytes([bytes[26], bytes[27]]), 2);
        assert_eq!(&bytes[28..32], &[0xFF; 4]);
    }

    #[test]
    fn lookup_ignores_case() {
        let file = sample();
        assert!(file.sprite("WALK").is_some());
        assert_eq!(file.sprite("walk").unwrap().frame_count(), 2);
        assert!(file.sprite("run").is_none());
    }

    #[test]
    fn re_adding_a_name_replaces_in_place() {
        let mut file = sample();
        let mut replacement = Sprite::new("WALK");
        replacement.add_state_id(7);
        file.add_sprite(replacement).unwrap();
        assert_eq!(file.sprite_count(), 2);
        let first = file.sprites().next().unwrap();
        assert_eq!(first.name(), "WALK");
        assert_eq!(first.state_ids(), &[7]);
    }

    #[test]
    fn empty_name_is_rejected() {
        let mut file = SpriteFile::default();
        assert!(matches!(
            file.add_sprite(Sprite::new("")),
            Err(FormatError::InvalidData(_))
        ));
    }

    #[test]
    fn remove_sprite_keeps_order() {
        let mut file = sample();
        file.add_sprite(Sprite::new("jump")).unwrap();
        assert!(file.remove_sprite("Walk").is_some());
        let names: Vec<_> = file.sprites().map(Sprite::name).collect();
        assert_eq!(names, ["idle", "jump"]);
    }

    #[test]
    fn bad_header_is_rejected() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            SpriteFile::from_bytes(&bytes),
            Err(FormatError::BadMagic { .. })
        ));
        let mut bytes = sample().to_bytes().unwrap();
        bytes[6] = 9;
        assert!(matches!(
            SpriteFile::from_bytes(&bytes),
            Err(FormatError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn truncated_data_is_a_stream_error() {
        let bytes = sample().to_bytes().unwrap();
        assert!(matches!(
            SpriteFile::from_bytes(&bytes[..40]),
            Err(FormatError::Stream(_))
        ));
    }
}
