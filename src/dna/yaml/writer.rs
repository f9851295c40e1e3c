use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{DNA_TYPE_KEY, YamlNode, emit};
use crate::error::DnaError;

/// Builds a YAML document scope by scope.
///
/// Inside a mapping every value needs a name; inside a sequence names are
/// ignored and values are appended in order.
#[derive(Debug)]
pub struct YamlDocWriter {
    stack: Vec<(String, YamlNode)>,
}

macro_rules! write_hex {
    ($($name:ident => $ty:ty, $width:literal),* $(,)?) => {
        $(
            pub fn $name(&mut self, name: &str, value: $ty) {
                self.add(name, YamlNode::Scalar(format!("0x{value:0width$X}", width = $width)));
            }
        )*
    };
}

macro_rules! write_decimal {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&mut self, name: &str, value: $ty) {
                self.add(name, YamlNode::Scalar(value.to_string()));
            }
        )*
    };
}

impl YamlDocWriter {
    /// Starts a document tagged with `class_type`. An empty tag is left out.
    #[must_use]
    pub fn new(class_type: &str) -> Self {
        let mut root = Vec::new();
        if !class_type.is_empty() {
            root.push((DNA_TYPE_KEY.to_string(), YamlNode::Text(class_type.to_string())));
        }
        Self {
            stack: vec![(String::new(), YamlNode::Mapping(root))],
        }
    }

    fn add(&mut self, name: &str, node: YamlNode) {
        let Some((_, parent)) = self.stack.last_mut() else {
            return;
        };
        match parent {
            YamlNode::Mapping(entries) => {
                if let Some(slot) = entries.iter_mut().find(|(k, _)| k == name) {
                    slot.1 = node;
                } else {
                    entries.push((name.to_string(), node));
                }
            }
            YamlNode::Sequence { items, .. } => items.push(node),
            YamlNode::Scalar(_) | YamlNode::Text(_) => {}
        }
    }

    pub fn enter_sub_record(&mut self, name: &str) {
        self.stack.push((name.to_string(), YamlNode::empty_mapping()));
    }

    /// Opens a sequence. `flow` sequences of scalars print on one line.
    pub fn enter_sub_vector(&mut self, name: &str, flow: bool) {
        self.stack.push((name.to_string(), YamlNode::empty_sequence(flow)));
    }

    /// Closes the innermost scope and attaches it to its parent.
    ///
    /// # Errors
    ///
    /// Returns [`DnaError::ScopeUnderflow`] at the root.
    pub fn leave(&mut self) -> Result<(), DnaError> {
        if self.stack.len() <= 1 {
            return Err(DnaError::ScopeUnderflow);
        }
        let Some((name, node)) = self.stack.pop() else {
            return Err(DnaError::ScopeUnderflow);
        };
        self.add(&name, node);
        Ok(())
    }

    write_hex! {
        write_u8 => u8, 2,
        write_u16 => u16, 4,
        write_u32 => u32, 8,
        write_u64 => u64, 16,
    }

    write_decimal! {
        write_i8 => i8,
        write_i16 => i16,
        write_i32 => i32,
        write_i64 => i64,
    }

    pub fn write_bool(&mut self, name: &str, value: bool) {
        let text = if value { "True" } else { "False" };
        self.add(name, YamlNode::Scalar(text.to_string()));
    }

    pub fn write_f32(&mut self, name: &str, value: f32) {
        self.add(name, YamlNode::Scalar(format!("{value:.6}")));
    }

    pub fn write_f64(&mut self, name: &str, value: f64) {
        self.add(name, YamlNode::Scalar(format!("{value:.6}")));
    }

    pub fn write_string(&mut self, name: &str, value: &str) {
        self.add(name, YamlNode::Text(value.to_string()));
    }

    pub fn write_buffer(&mut self, name: &str, value: &[u8]) {
        self.add(name, YamlNode::Text(STANDARD.encode(value)));
    }

    /// Closes any open scopes and returns the root node.
    #[must_use]
    pub fn into_node(mut self) -> YamlNode {
        while self.leave().is_ok() {}
        self.stack
            .pop()
            .map_or_else(YamlNode::empty_mapping, |(_, node)| node)
    }

    /// Closes any open scopes and renders the document.
    #[must_use]
    pub fn finish(self) -> String {
        emit(&self.into_node())
    }
}
