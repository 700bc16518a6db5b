//! Integer parsing and formatting over code units.
//!
//! Parsers never rely on wraparound: every accumulation step is checked
//! against the target type's boundary before it is taken, and overflow is
//! reported as a [`ParseStatus`] rather than an error.

use crate::encoding::CodeUnit;

/// Outcome of an integer parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    ParsingSuccessful,
    /// The numeral is well formed but not representable in the target type.
    Overflow,
    /// Empty input, a lone sign, a `+` sign, or a non-digit start.
    NoNumber,
}

/// Result of [`try_parse_i32`] and friends.
///
/// `consumed` counts the sign and digits of the numeral. Trailing content is
/// never consumed and never causes a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed<T> {
    pub status: ParseStatus,
    pub value: T,
    pub consumed: usize,
}

impl<T: Default> Parsed<T> {
    fn ok(value: T, consumed: usize) -> Self {
        Self {
            status: ParseStatus::ParsingSuccessful,
            value,
            consumed,
        }
    }

    fn overflow(consumed: usize) -> Self {
        Self {
            status: ParseStatus::Overflow,
            value: T::default(),
            consumed,
        }
    }

    fn no_number() -> Self {
        Self {
            status: ParseStatus::NoNumber,
            value: T::default(),
            consumed: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ParseStatus::ParsingSuccessful
    }
}

#[inline]
fn digit<U: CodeUnit>(unit: U) -> Option<u8> {
    match unit.ascii() {
        Some(b @ b'0'..=b'9') => Some(b - b'0'),
        _ => None,
    }
}

#[inline]
fn sign<U: CodeUnit>(input: &[U]) -> (bool, usize) {
    match input.first().and_then(|unit| unit.ascii()) {
        Some(b'-') => (true, 1),
        _ => (false, 0),
    }
}

// Signed values accumulate on the negative side, where the range is one
// larger, so MIN parses without a special case.
macro_rules! signed_parser {
    ($(#[$meta:meta])* $name:ident, $t:ty) => {
        $(#[$meta])*
        pub fn $name<U: CodeUnit>(input: &[U]) -> Parsed<$t> {
            let (negative, mut i) = sign(input);
            let digits_start = i;
            let limit: $t = if negative { <$t>::MIN } else { -<$t>::MAX };
            let mul_min = limit / 10;
            let mut acc: $t = 0;
            let mut overflow = false;
            while let Some(d) = input.get(i).copied().and_then(digit) {
                if !overflow {
                    let d = d as $t;
                    if acc < mul_min {
                        overflow = true;
                    } else {
                        acc *= 10;
                        if acc < limit + d {
                            overflow = true;
                        } else {
                            acc -= d;
                        }
                    }
                }
                i += 1;
            }
            if i == digits_start {
                return Parsed::no_number();
            }
            if overflow {
                return Parsed::overflow(i);
            }
            Parsed::ok(if negative { acc } else { -acc }, i)
        }
    };
}

macro_rules! unsigned_parser {
    ($(#[$meta:meta])* $name:ident, $t:ty) => {
        $(#[$meta])*
        pub fn $name<U: CodeUnit>(input: &[U]) -> Parsed<$t> {
            let (negative, mut i) = sign(input);
            let digits_start = i;
            let mut acc: $t = 0;
            let mut overflow = false;
            while let Some(d) = input.get(i).copied().and_then(digit) {
                if !overflow {
                    match acc.checked_mul(10).and_then(|v| v.checked_add(d as $t)) {
                        Some(next) => acc = next,
                        None => overflow = true,
                    }
                }
                i += 1;
            }
            if i == digits_start {
                return Parsed::no_number();
            }
            // `-0` is zero; any other negative numeral is out of range.
            if overflow || (negative && acc != 0) {
                return Parsed::overflow(i);
            }
            Parsed::ok(acc, i)
        }
    };
}

signed_parser!(
    /// Parses an optionally `-`-signed decimal numeral into an `i32`.
    ///
    /// ```
    /// use contract_json::number::{try_parse_i32, ParseStatus};
    ///
    /// let parsed = try_parse_i32(b"-42,".as_slice());
    /// assert_eq!(parsed.status, ParseStatus::ParsingSuccessful);
    /// assert_eq!((parsed.value, parsed.consumed), (-42, 3));
    /// ```
    try_parse_i32,
    i32
);
signed_parser!(
    /// Parses an optionally `-`-signed decimal numeral into an `i64`.
    try_parse_i64,
    i64
);
unsigned_parser!(
    /// Parses a decimal numeral into a `u32`.
    try_parse_u32,
    u32
);
unsigned_parser!(
    /// Parses a decimal numeral into a `u64`.
    try_parse_u64,
    u64
);

/// Number of decimal digits in `value`.
pub(crate) fn digit_count(mut value: u64) -> usize {
    let mut count = 1;
    while value >= 10 {
        value /= 10;
        count += 1;
    }
    count
}

/// Renders the digits of `value` right to left into `out`, which must be
/// exactly [`digit_count`] units long.
pub(crate) fn render_u64<U: CodeUnit>(mut value: u64, out: &mut [U]) {
    for slot in out.iter_mut().rev() {
        *slot = U::from_ascii(b'0' + (value % 10) as u8);
        value /= 10;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i32s(text: &str) -> Parsed<i32> {
        try_parse_i32(text.as_bytes())
    }

    #[test]
    fn boundaries() {
        assert_eq!(i32s("2147483647").value, i32::MAX);
        assert_eq!(i32s("-2147483648").value, i32::MIN);
        assert_eq!(i32s("2147483648").status, ParseStatus::Overflow);
        assert_eq!(i32s("-2147483649").status, ParseStatus::Overflow);
        assert_eq!(
            try_parse_i64(b"-9223372036854775808".as_slice()).value,
            i64::MIN
        );
        assert_eq!(
            try_parse_i64(b"9223372036854775808".as_slice()).status,
            ParseStatus::Overflow
        );
    }

    #[test]
    fn no_number_cases() {
        for text in ["", "-", "+", "k", "+1", "-x"] {
            let parsed = i32s(text);
            assert_eq!(parsed.status, ParseStatus::NoNumber, "{text:?}");
            assert_eq!(parsed.consumed, 0);
        }
    }

    #[test]
    fn leading_zeroes_and_trailing_content() {
        let parsed = i32s("000000140105");
        assert_eq!((parsed.value, parsed.consumed), (140105, 12));
        let parsed = i32s("12.50");
        assert_eq!((parsed.value, parsed.consumed), (12, 2));
    }

    #[test]
    fn overflow_consumes_the_whole_numeral() {
        let parsed = i32s("99999999999]");
        assert_eq!(parsed.status, ParseStatus::Overflow);
        assert_eq!(parsed.consumed, 11);
    }

    #[test]
    fn unsigned_sign_handling() {
        assert_eq!(try_parse_u32(b"-0".as_slice()).value, 0);
        assert!(try_parse_u32(b"-0".as_slice()).is_ok());
        assert_eq!(
            try_parse_u32(b"-1".as_slice()).status,
            ParseStatus::Overflow
        );
        assert_eq!(try_parse_u32(b"4294967295".as_slice()).value, u32::MAX);
        assert_eq!(
            try_parse_u32(b"4294967296".as_slice()).status,
            ParseStatus::Overflow
        );
        assert_eq!(
            try_parse_u64(b"18446744073709551615".as_slice()).value,
            u64::MAX
        );
    }

    #[test]
    fn utf16_input() {
        let units: Vec<u16> = "-123".encode_utf16().collect();
        assert_eq!(try_parse_i32(&units).value, -123);
    }

    #[test]
    fn renders_digits_in_place() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(u64::MAX), 20);
        let mut out = [0u16; 3];
        render_u64(907, &mut out);
        assert_eq!(String::from_utf16(&out).unwrap(), "907");
    }
}
