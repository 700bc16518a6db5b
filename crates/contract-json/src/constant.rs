//! Pre-encoded JSON fragments.

use std::fmt;

use crate::writer::escape::escape_str;

/// A literal JSON fragment held in both UTF-8 and UTF-16.
///
/// Built once when a contract is constructed; writing one is a plain copy of
/// the form that matches the writer's encoding.
///
/// ```
/// use contract_json::ConstantValue;
///
/// let key = ConstantValue::object_key("name");
/// assert_eq!(key.utf8(), br#""name":"#);
/// assert_eq!(key.utf16().len(), 7);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ConstantValue {
    utf8: Box<[u8]>,
    utf16: Box<[u16]>,
}

impl ConstantValue {
    /// Wraps JSON text that is already valid where it will be written.
    pub fn raw(text: &str) -> Self {
        Self {
            utf8: text.as_bytes().into(),
            utf16: text.encode_utf16().collect(),
        }
    }

    /// The quoted, escaped property name followed by `:`.
    pub fn object_key(name: &str) -> Self {
        let mut text = String::with_capacity(name.len() + 3);
        text.push('"');
        escape_str(name, false, &mut text);
        text.push_str("\":");
        Self::raw(&text)
    }

    /// A quoted, escaped string value.
    pub fn string(value: &str) -> Self {
        let mut text = String::with_capacity(value.len() + 2);
        text.push('"');
        escape_str(value, false, &mut text);
        text.push('"');
        Self::raw(&text)
    }

    pub fn utf8(&self) -> &[u8] {
        &self.utf8
    }

    pub fn utf16(&self) -> &[u16] {
        &self.utf16
    }

    /// Length in UTF-8 bytes.
    pub fn utf8_len(&self) -> usize {
        self.utf8.len()
    }

    /// Length in UTF-16 code units.
    pub fn utf16_len(&self) -> usize {
        self.utf16.len()
    }

    /// Whether the fragment is pure ASCII.
    pub fn is_ascii(&self) -> bool {
        self.utf8.is_ascii()
    }
}

impl fmt::Debug for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstantValue")
            .field(&String::from_utf8_lossy(&self.utf8))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_keys_are_escaped() {
        let key = ConstantValue::object_key("a\"b");
        assert_eq!(key.utf8(), br#""a\"b":"#);
    }

    #[test]
    fn encodings_agree() {
        let value = ConstantValue::string("grüß 😀");
        let decoded = String::from_utf16(value.utf16()).unwrap();
        assert_eq!(decoded.as_bytes(), value.utf8());
        assert_eq!(value.utf16_len(), 9);
        assert!(!value.is_ascii());
    }

    #[test]
    fn debug_shows_text() {
        assert_eq!(
            format!("{:?}", ConstantValue::raw("{}")),
            r#"ConstantValue("{}")"#
        );
    }
}
