//! JSON string escaping shared by the writer and constant construction.

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Longest escape sequence: a `\uXXXX\uXXXX` surrogate pair.
pub(crate) const MAX_ESCAPE_LEN: usize = 12;

/// Whether `ch` must be escaped inside a JSON string.
#[inline]
pub(crate) fn needs_escape(ch: char, escape_non_ascii: bool) -> bool {
    matches!(ch, '"' | '\\' | '\u{0}'..='\u{1F}') || (escape_non_ascii && !ch.is_ascii())
}

/// Writes the ASCII escape sequence for `ch` into `out` and returns its
/// length. Only called for characters where [`needs_escape`] holds.
pub(crate) fn escape_char(ch: char, out: &mut [u8; MAX_ESCAPE_LEN]) -> usize {
    let short = match ch {
        '"' => b'"',
        '\\' => b'\\',
        '\n' => b'n',
        '\r' => b'r',
        '\t' => b't',
        '\u{8}' => b'b',
        '\u{C}' => b'f',
        _ => {
            let mut pair = [0u16; 2];
            let units = ch.encode_utf16(&mut pair);
            let mut len = 0;
            for unit in units.iter() {
                out[len] = b'\\';
                out[len + 1] = b'u';
                for (i, shift) in [12, 8, 4, 0].into_iter().enumerate() {
                    out[len + 2 + i] = HEX[usize::from((*unit >> shift) & 0xF)];
                }
                len += 6;
            }
            return len;
        }
    };
    out[0] = b'\\';
    out[1] = short;
    2
}

/// Escapes `text` as JSON string contents (without quotes).
pub(crate) fn escape_str(text: &str, escape_non_ascii: bool, out: &mut String) {
    let mut scratch = [0u8; MAX_ESCAPE_LEN];
    for ch in text.chars() {
        if needs_escape(ch, escape_non_ascii) {
            let len = escape_char(ch, &mut scratch);
            out.extend(scratch[..len].iter().map(|&b| char::from(b)));
        } else {
            out.push(ch);
        }
    }
}
