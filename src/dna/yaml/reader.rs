use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::warn;

use super::{DNA_TYPE_KEY, YamlNode, parse_bool, parse_float, parse_int};
use crate::error::DnaError;

/// One open scope: which child of the parent it is, and how far a
/// sequence has been consumed.
#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    child: usize,
    cursor: usize,
}

/// Cursor over a parsed YAML document.
///
/// Fields are looked up by name in mappings and taken in order from
/// sequences. Anything missing reads as zero, false, or empty and logs a
/// warning.
#[derive(Debug)]
pub struct YamlDocReader {
    root: YamlNode,
    stack: Vec<Frame>,
}

macro_rules! read_ints {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            pub fn $name(&mut self, name: &str) -> $ty {
                self.read_scalar(name).map_or(0, |text| parse_int(&text) as $ty)
            }
        )*
    };
}

impl YamlDocReader {
    /// Parses a document. The root must be a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::Yaml`] on a syntax error and
    /// [`DnaError::NotAMapping`] if the root is anything else.
    pub fn parse(text: &str) -> Result<Self, DnaError> {
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        let root = YamlNode::from_value(&value);
        if !matches!(root, YamlNode::Mapping(_)) {
            return Err(DnaError::NotAMapping);
        }
        Ok(Self::from_node(root))
    }

    #[must_use]
    pub fn from_node(root: YamlNode) -> Self {
        Self {
            root,
            stack: vec![Frame::default()],
        }
    }

    /// Type tag stored at the document root.
    #[must_use]
    pub fn class_type(&self) -> Option<&str> {
        self.root.get(DNA_TYPE_KEY).and_then(YamlNode::as_scalar)
    }

    /// # Errors
    ///
    /// Returns [`DnaError::ClassTypeMismatch`] if the document is tagged
    /// with another type or not tagged at all.
    pub fn validate_class_type(&self, expected: &str) -> Result<(), DnaError> {
        match self.class_type() {
            Some(found) if found == expected => Ok(()),
            found => Err(DnaError::ClassTypeMismatch {
                expected: expected.to_string(),
                found: found.unwrap_or_default().to_string(),
            }),
        }
    }

    fn current(&self) -> &YamlNode {
        let mut node = &self.root;
        for frame in &self.stack[1..] {
            node = match node {
                YamlNode::Mapping(entries) => &entries[frame.child].1,
                YamlNode::Sequence { items, .. } => &items[frame.child],
                _ => node,
            };
        }
        node
    }

    /// Depth of open scopes below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Whether the current scope has a value under `name`, or another
    /// unread item if it is a sequence.
    #[must_use]
    pub fn has_val(&self, name: &str) -> bool {
        match self.current() {
            YamlNode::Mapping(entries) => entries.iter().any(|(k, _)| k == name),
            YamlNode::Sequence { items, .. } => {
                self.stack.last().is_some_and(|frame| frame.cursor < items.len())
            }
            _ => false,
        }
    }

    fn locate(&mut self, name: &str) -> Option<usize> {
        let len = match self.current() {
            YamlNode::Mapping(entries) => {
                return entries.iter().position(|(k, _)| k == name);
            }
            YamlNode::Sequence { items, .. } => items.len(),
            _ => return None,
        };
        let frame = self.stack.last_mut()?;
        if frame.cursor >= len {
            return None;
        }
        frame.cursor += 1;
        Some(frame.cursor - 1)
    }

    fn child(&self, index: usize) -> Option<&YamlNode> {
        match self.current() {
            YamlNode::Mapping(entries) => entries.get(index).map(|(_, v)| v),
            YamlNode::Sequence { items, .. } => items.get(index),
            _ => None,
        }
    }

    fn missing(name: &str) {
        if !name.is_empty() {
            warn!(field = name, "unable to find field, using default");
        }
    }

    /// Enters the record stored under `name`, or the next item of a
    /// sequence. Returns false if there is none.
    pub fn enter_sub_record(&mut self, name: &str) -> bool {
        let Some(child) = self.locate(name) else {
            Self::missing(name);
            return false;
        };
        self.stack.push(Frame { child, cursor: 0 });
        true
    }

    /// Enters the sequence stored under `name` and returns its length.
    /// `Ok(None)` means the field is absent.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::MissingScope`] if the field exists but is not a
    /// sequence.
    pub fn enter_sub_vector(&mut self, name: &str) -> Result<Option<usize>, DnaError> {
        let Some(child) = self.locate(name) else {
            Self::missing(name);
            return Ok(None);
        };
        let Some(YamlNode::Sequence { items, .. }) = self.child(child) else {
            return Err(DnaError::MissingScope {
                kind: "vector",
                name: name.to_string(),
            });
        };
        let len = items.len();
        self.stack.push(Frame { child, cursor: 0 });
        Ok(Some(len))
    }

    /// Closes the innermost scope.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::ScopeUnderflow`] at the root.
    pub fn leave(&mut self) -> Result<(), DnaError> {
        if self.stack.len() <= 1 {
            return Err(DnaError::ScopeUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    fn read_scalar(&mut self, name: &str) -> Option<String> {
        if let Some(text) = self.current().as_scalar() {
            return Some(text.to_string());
        }
        let text = self
            .locate(name)
            .and_then(|index| self.child(index))
            .and_then(YamlNode::as_scalar)
            .map(str::to_string);
        if text.is_none() {
            Self::missing(name);
        }
        text
    }

    read_ints! {
        read_u8 => u8,
        read_u16 => u16,
        read_u32 => u32,
        read_u64 => u64,
        read_i8 => i8,
        read_i16 => i16,
        read_i32 => i32,
        read_i64 => i64,
    }

    pub fn read_bool(&mut self, name: &str) -> bool {
        self.read_scalar(name).is_some_and(|text| parse_bool(&text))
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn read_f32(&mut self, name: &str) -> f32 {
        self.read_scalar(name).map_or(0.0, |text| parse_float(&text) as f32)
    }

    pub fn read_f64(&mut self, name: &str) -> f64 {
        self.read_scalar(name).map_or(0.0, |text| parse_float(&text))
    }

    pub fn read_string(&mut self, name: &str) -> String {
        self.read_scalar(name).unwrap_or_default()
    }

    /// Decodes a base64 blob.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::Base64`] if the text is not valid base64.
    pub fn read_buffer(&mut self, name: &str) -> Result<Vec<u8>, DnaError> {
        let Some(text) = self.read_scalar(name) else {
            return Ok(Vec::new());
        };
        STANDARD.decode(text.trim()).map_err(|e| DnaError::Base64 {
            field: name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
DNAType: test::Record
id: 0x2A
mode: \"017\"
flag: True
scale: 1.250000
name: Link
items:
  - a: 1
  - a: 2
pos: [1.0, 2.0, 3.0]
blob: AQID
";

    #[test]
    fn reads_scalars_by_name() {
        let mut reader = YamlDocReader::parse(DOC).unwrap();
        assert_eq!(reader.class_type(), Some("test::Record"));
        assert_eq!(reader.read_u32("id"), 42);
        assert_eq!(reader.read_u8("mode"), 15);
        assert!(reader.read_bool("flag"));
        assert!((reader.read_f32("scale") - 1.25).abs() < f32::EPSILON);
        assert_eq!(reader.read_string("name"), "Link");
        assert_eq!(reader.read_buffer("blob").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_fields_default() {
        let mut reader = YamlDocReader::parse(DOC).unwrap();
        assert_eq!(reader.read_u16("absent"), 0);
        assert!(!reader.read_bool("absent"));
        assert_eq!(reader.read_string("absent"), "");
        assert!(!reader.enter_sub_record("absent"));
        assert_eq!(reader.enter_sub_vector("absent").unwrap(), None);
    }

    #[test]
    fn walks_sequences_in_order() {
        let mut reader = YamlDocReader::parse(DOC).unwrap();
        assert_eq!(reader.enter_sub_vector("items").unwrap(), Some(2));
        let mut values = Vec::new();
        while reader.has_val("") {
            assert!(reader.enter_sub_record(""));
            values.push(reader.read_u8("a"));
            reader.leave().unwrap();
        }
        reader.leave().unwrap();
        assert_eq!(values, [1, 2]);

        assert_eq!(reader.enter_sub_vector("pos").unwrap(), Some(3));
        let pos: Vec<f32> = (0..3).map(|_| reader.read_f32("")).collect();
        assert_eq!(pos, [1.0, 2.0, 3.0]);
        reader.leave().unwrap();
        assert_eq!(reader.depth(), 0);
    }

    #[test]
    fn scope_errors() {
        let mut reader = YamlDocReader::parse(DOC).unwrap();
        assert!(matches!(reader.leave(), Err(DnaError::ScopeUnderflow)));
        assert!(matches!(
            reader.enter_sub_vector("name"),
            Err(DnaError::MissingScope { kind: "vector", .. })
        ));
    }

    #[test]
    fn class_type_checks() {
        let reader = YamlDocReader::parse(DOC).unwrap();
        assert!(reader.validate_class_type("test::Record").is_ok());
        assert!(matches!(
            reader.validate_class_type("other"),
            Err(DnaError::ClassTypeMismatch { .. })
        ));
    }

    #[test]
    fn root_must_be_a_mapping() {
        assert!(matches!(YamlDocReader::parse("- 1\n- 2\n"), Err(DnaError::NotAMapping)));
        assert!(matches!(YamlDocReader::parse("a: [\n"), Err(DnaError::Yaml(_))));
    }

    #[test]
    fn bad_base64_is_reported() {
        let mut reader = YamlDocReader::parse("blob: \"***\"\n").unwrap();
        assert!(matches!(
            reader.read_buffer("blob"),
            Err(DnaError::Base64 { ref field, .. }) if field == "blob"
        ));
    }
}
