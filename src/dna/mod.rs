//! Declarative record serialization.
//!
//! A record declared with [`dna_record!`](crate::dna_record) reads and
//! writes itself field by field in a fixed byte order, and converts to and
//! from a YAML document tagged with its `DNAType`.

mod field;
mod macros;
pub mod yaml;

pub use field::{
    Align, Buffer, CString, DnaCount, DnaField, FixedString, FixedWString, Seek, WString, origin,
    read_vec, read_yaml_vec, vec_size, write_vec, write_yaml_vec,
};
pub use yaml::{YamlDocReader, YamlDocWriter};

use crate::error::DnaError;
use crate::io::{Endian, MemoryReader, Reader, VectorWriter, Writer};

/// Binary side of a record.
pub trait Dna: Sized {
    /// Byte order of every multi-byte field.
    const ENDIAN: Endian;

    /// # Errors
    ///
    /// Returns [`DnaError::Stream`] if the stream runs short.
    fn read<R: Reader>(reader: &mut R) -> Result<Self, DnaError>;

    /// # Errors
    ///
    /// Returns [`DnaError::Stream`] if the stream rejects a write.
    fn write<W: Writer>(&self, writer: &mut W) -> Result<(), DnaError>;

    /// Offset just past the record when it starts at `base`.
    fn binary_size(&self, base: usize) -> usize;

    /// # Errors
    ///
    /// See [`Dna::read`].
    fn from_bytes(data: &[u8]) -> Result<Self, DnaError> {
        Self::read(&mut MemoryReader::with_endian(data, Self::ENDIAN))
    }

    /// # Errors
    ///
    /// See [`Dna::write`].
    fn to_bytes(&self) -> Result<Vec<u8>, DnaError> {
        let mut writer = VectorWriter::with_endian(Self::ENDIAN);
        self.write(&mut writer)?;
        Ok(writer.into_inner())
    }
}

/// YAML side of a record.
pub trait DnaYaml: Dna {
    /// Value of the `DNAType` key.
    const DNA_TYPE: &'static str;

    /// # Errors
    ///
    /// Returns a [`DnaError`] if a field has the wrong shape.
    fn read_yaml(reader: &mut YamlDocReader) -> Result<Self, DnaError>;

    /// # Errors
    ///
    /// Returns [`DnaError::ScopeUnderflow`] if scopes are unbalanced.
    fn write_yaml(&self, writer: &mut YamlDocWriter) -> Result<(), DnaError>;

    /// Renders the record as a tagged YAML document.
    ///
    /// # Errors
    ///
    /// See [`DnaYaml::write_yaml`].
    fn to_yaml_string(&self) -> Result<String, DnaError> {
        let mut writer = YamlDocWriter::new(Self::DNA_TYPE);
        self.write_yaml(&mut writer)?;
        Ok(writer.finish())
    }

    /// Parses a tagged YAML document.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::ClassTypeMismatch`] if the `DNAType` key names
    /// another record, or any error of [`YamlDocReader::parse`].
    fn from_yaml_str(text: &str) -> Result<Self, DnaError> {
        let mut reader = YamlDocReader::parse(text)?;
        reader.validate_class_type(Self::DNA_TYPE)?;
        Self::read_yaml(&mut reader)
    }
}
