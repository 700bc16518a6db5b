//! Decoding of JSON string escapes.

use std::borrow::Cow;

use crate::encoding::CodeUnit;

fn hex_value<U: CodeUnit>(units: &[U]) -> Option<u32> {
    if units.len() != 4 {
        return None;
    }
    units.iter().try_fold(0u32, |acc, unit| {
        let digit = (unit.ascii()? as char).to_digit(16)?;
        Some((acc << 4) | digit)
    })
}

/// Decodes the contents of a string token (quotes already removed).
///
/// Runs without escapes are decoded in one step; `\uXXXX` pairs that form a
/// surrogate pair are combined. Unpaired surrogates and raw control
/// characters are rejected.
pub(crate) fn unescape<U: CodeUnit>(units: &[U]) -> Result<Cow<'_, str>, &'static str> {
    let needs_work = units
        .iter()
        .any(|unit| matches!(unit.ascii(), Some(b'\\') | Some(0x00..=0x1F)));
    if !needs_work {
        if let Some(text) = U::borrow_str(units) {
            return Ok(Cow::Borrowed(text));
        }
    }

    let mut out = String::with_capacity(units.len());
    let mut run_start = 0;
    let mut i = 0;
    while i < units.len() {
        match units[i].ascii() {
            Some(0x00..=0x1F) => return Err("unescaped control character"),
            Some(b'\\') => {
                U::decode_run(&units[run_start..i], &mut out)?;
                i = decode_escape(units, i, &mut out)?;
                run_start = i;
            }
            _ => i += 1,
        }
    }
    U::decode_run(&units[run_start..], &mut out)?;
    Ok(Cow::Owned(out))
}

/// Decodes the escape starting at `units[at]` (a backslash) and returns the
/// index just past it.
fn decode_escape<U: CodeUnit>(units: &[U], at: usize, out: &mut String) -> Result<usize, &'static str> {
    let kind = units
        .get(at + 1)
        .and_then(|unit| unit.ascii())
        .ok_or("invalid escape sequence")?;
    let simple = match kind {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\u{08}',
        b'f' => '\u{0C}',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => return decode_unicode_escape(units, at, out),
        _ => return Err("invalid escape sequence"),
    };
    out.push(simple);
    Ok(at + 2)
}

fn decode_unicode_escape<U: CodeUnit>(units: &[U], at: usize, out: &mut String) -> Result<usize, &'static str> {
    let first = units
        .get(at + 2..at + 6)
        .and_then(hex_value)
        .ok_or("invalid unicode escape")?;
    match first {
        0xD800..=0xDBFF => {
            let is_low_escape = units.get(at + 6).and_then(|u| u.ascii()) == Some(b'\\')
                && units.get(at + 7).and_then(|u| u.ascii()) == Some(b'u');
            if !is_low_escape {
                return Err("unpaired surrogate");
            }
            let second = units
                .get(at + 8..at + 12)
                .and_then(hex_value)
                .ok_or("invalid unicode escape")?;
            if !(0xDC00..=0xDFFF).contains(&second) {
                return Err("unpaired surrogate");
            }
            let code = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
            out.push(char::from_u32(code).ok_or("invalid unicode escape")?);
            Ok(at + 12)
        }
        0xDC00..=0xDFFF => Err("unpaired surrogate"),
        _ => {
            out.push(char::from_u32(first).ok_or("invalid unicode escape")?);
            Ok(at + 6)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf8(text: &str) -> Result<Cow<'_, str>, &'static str> {
        unescape(text.as_bytes())
    }

    fn utf16(text: &str) -> Result<String, &'static str> {
        let units: Vec<u16> = text.encode_utf16().collect();
        unescape(&units).map(Cow::into_owned)
    }

    #[test]
    fn plain_utf8_is_borrowed() {
        assert!(matches!(utf8("héllo"), Ok(Cow::Borrowed("héllo"))));
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(
            utf8(r#"a\"b\\c\/d\b\f\n\r\t"#).unwrap(),
            "a\"b\\c/d\u{08}\u{0C}\n\r\t"
        );
        assert_eq!(utf16(r#"x\ny"#).unwrap(), "x\ny");
    }

    #[test]
    fn unicode_escapes_and_surrogate_pairs() {
        assert_eq!(utf8(r"\u00e9").unwrap(), "é");
        assert_eq!(utf8(r"\uD83D\uDE00!").unwrap(), "😀!");
        assert_eq!(utf16(r"\uD83D\ude00").unwrap(), "😀");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(utf8(r"\uD83D"), Err("unpaired surrogate"));
        assert_eq!(utf8(r"\uDE00"), Err("unpaired surrogate"));
        assert_eq!(utf8(r"\uD83Dx"), Err("unpaired surrogate"));
        assert_eq!(utf8(r"\u12"), Err("invalid unicode escape"));
        assert_eq!(utf8(r"\q"), Err("invalid escape sequence"));
        assert_eq!(utf8("\\"), Err("invalid escape sequence"));
        assert_eq!(utf8("a\nb"), Err("unescaped control character"));
        assert_eq!(unescape(&[0xFFu8]), Err("invalid UTF-8"));
    }
}
