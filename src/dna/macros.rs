/// Declares a DNA record and implements [`Dna`](crate::dna::Dna),
/// [`DnaYaml`](crate::dna::DnaYaml), [`DnaField`](crate::dna::DnaField) and
/// `Default` for it.
///
/// The header names the byte order (`Little` or `Big`) and the `DNAType`
/// tag. Fields are laid out in declaration order. A `Vec` field takes its
/// length from an earlier integer field named after `=>`.
///
/// ```
/// use athena::dna::{CString, Dna};
///
/// athena::dna_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Table(Big, "demo::Table") {
///         pub count: u16,
///         pub values: Vec<u32> => count,
///         pub label: CString,
///     }
/// }
///
/// let table = Table { count: 2, values: vec![1, 2], label: "ab".into() };
/// let bytes = table.to_bytes().unwrap();
/// assert_eq!(bytes.len(), 2 + 8 + 3);
/// assert_eq!(Table::from_bytes(&bytes).unwrap(), table);
/// ```
#[macro_export]
macro_rules! dna_record {
    (@read $reader:ident, $endian:expr, $ty:ty) => {
        <$ty as $crate::dna::DnaField>::read_field($reader, $endian)?
    };
    (@read $reader:ident, $endian:expr, $ty:ty, $count:ident) => {
        $crate::dna::read_vec($reader, $endian, $crate::dna::DnaCount::as_count(&$count))?
    };

    (@write $this:ident, $writer:ident, $endian:expr, $field:ident, $ty:ty) => {
        $crate::dna::DnaField::write_field(&$this.$field, $writer, $endian)?
    };
    (@write $this:ident, $writer:ident, $endian:expr, $field:ident, $ty:ty, $count:ident) => {
        $crate::dna::write_vec(&$this.$field, $writer, $endian)?
    };

    (@size $this:ident, $offset:ident, $field:ident, $ty:ty) => {
        $crate::dna::DnaField::field_size(&$this.$field, $offset)
    };
    (@size $this:ident, $offset:ident, $field:ident, $ty:ty, $count:ident) => {
        $crate::dna::vec_size(&$this.$field, $offset)
    };

    (@read_yaml $reader:ident, $field:ident, $ty:ty) => {
        <$ty as $crate::dna::DnaField>::read_yaml_field($reader, stringify!($field))?
    };
    (@read_yaml $reader:ident, $field:ident, $ty:ty, $count:ident) => {
        $crate::dna::read_yaml_vec(
            $reader,
            stringify!($field),
            $crate::dna::DnaCount::as_count(&$count),
        )?
    };

    (@write_yaml $this:ident, $writer:ident, $field:ident, $ty:ty) => {
        $crate::dna::DnaField::write_yaml_field(&$this.$field, $writer, stringify!($field))?
    };
    (@write_yaml $this:ident, $writer:ident, $field:ident, $ty:ty, $count:ident) => {
        $crate::dna::write_yaml_vec(&$this.$field, $writer, stringify!($field))?
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($endian:ident, $dna_type:literal) {
            $(
                $(#[$fmeta:meta])*
                $fvis:vis $field:ident : $ty:ty $(=> $count:ident)?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$fmeta])*
                $fvis $field: $ty,
            )*
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self {
                    $($field: ::core::default::Default::default(),)*
                }
            }
        }

        impl $crate::dna::Dna for $name {
            const ENDIAN: $crate::io::Endian = $crate::io::Endian::$endian;

            fn read<R: $crate::io::Reader>(
                reader: &mut R,
            ) -> ::core::result::Result<Self, $crate::error::DnaError> {
                $(
                    let $field: $ty =
                        $crate::dna_record!(@read reader, Self::ENDIAN, $ty $(, $count)?);
                )*
                Ok(Self { $($field,)* })
            }

            fn write<W: $crate::io::Writer>(
                &self,
                writer: &mut W,
            ) -> ::core::result::Result<(), $crate::error::DnaError> {
                let this = self;
                $(
                    $crate::dna_record!(@write this, writer, Self::ENDIAN, $field, $ty $(, $count)?);
                )*
                Ok(())
            }

            fn binary_size(&self, base: usize) -> usize {
                let this = self;
                let offset = base;
                $(
                    let offset = $crate::dna_record!(@size this, offset, $field, $ty $(, $count)?);
                )*
                offset
            }
        }

        impl $crate::dna::DnaYaml for $name {
            const DNA_TYPE: &'static str = $dna_type;

            fn read_yaml(
                reader: &mut $crate::dna::YamlDocReader,
            ) -> ::core::result::Result<Self, $crate::error::DnaError> {
                $(
                    let $field: $ty =
                        $crate::dna_record!(@read_yaml reader, $field, $ty $(, $count)?);
                )*
                Ok(Self { $($field,)* })
            }

            fn write_yaml(
                &self,
                writer: &mut $crate::dna::YamlDocWriter,
            ) -> ::core::result::Result<(), $crate::error::DnaError> {
                let this = self;
                $(
                    $crate::dna_record!(@write_yaml this, writer, $field, $ty $(, $count)?);
                )*
                Ok(())
            }
        }

        impl $crate::dna::DnaField for $name {
            fn read_field<R: $crate::io::Reader>(
                reader: &mut R,
                _endian: $crate::io::Endian,
            ) -> ::core::result::Result<Self, $crate::error::DnaError> {
                <Self as $crate::dna::Dna>::read(reader)
            }

            fn write_field<W: $crate::io::Writer>(
                &self,
                writer: &mut W,
                _endian: $crate::io::Endian,
            ) -> ::core::result::Result<(), $crate::error::DnaError> {
                <Self as $crate::dna::Dna>::write(self, writer)
            }

            fn field_size(&self, offset: usize) -> usize {
                <Self as $crate::dna::Dna>::binary_size(self, offset)
            }

            fn read_yaml_field(
                reader: &mut $crate::dna::YamlDocReader,
                name: &str,
            ) -> ::core::result::Result<Self, $crate::error::DnaError> {
                if !reader.enter_sub_record(name) {
                    return Ok(<Self as ::core::default::Default>::default());
                }
                let value = <Self as $crate::dna::DnaYaml>::read_yaml(reader)?;
                reader.leave()?;
                Ok(value)
            }

            fn write_yaml_field(
                &self,
                writer: &mut $crate::dna::YamlDocWriter,
                name: &str,
            ) -> ::core::result::Result<(), $crate::error::DnaError> {
                writer.enter_sub_record(name);
                <Self as $crate::dna::DnaYaml>::write_yaml(self, writer)?;
                writer.leave()
            }
        }
    };
}
