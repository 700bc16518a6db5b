//! Integer parser boundaries and properties, plus integer reads from tokens.

use contract_json::number::{
    try_parse_i32, try_parse_i64, try_parse_u32, try_parse_u64, ParseStatus,
};
use contract_json::{JsonError, Tokenizer};
use proptest::prelude::*;

fn utf16(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[test]
fn i32_boundaries_in_both_encodings() {
    let cases = [
        ("2147483647", ParseStatus::ParsingSuccessful, i32::MAX),
        ("-2147483648", ParseStatus::ParsingSuccessful, i32::MIN),
        ("2147483648", ParseStatus::Overflow, 0),
        ("-2147483649", ParseStatus::Overflow, 0),
        ("", ParseStatus::NoNumber, 0),
        ("-", ParseStatus::NoNumber, 0),
        ("+", ParseStatus::NoNumber, 0),
        ("k", ParseStatus::NoNumber, 0),
    ];
    for (text, status, value) in cases {
        let parsed = try_parse_i32(text.as_bytes());
        assert_eq!((parsed.status, parsed.value), (status, value), "{text:?}");
        let parsed = try_parse_i32(&utf16(text));
        assert_eq!((parsed.status, parsed.value), (status, value), "{text:?}");
    }
}

#[test]
fn leading_zeroes_do_not_change_magnitude() {
    let parsed = try_parse_i32(b"000000140105".as_slice());
    assert!(parsed.is_ok());
    assert_eq!(parsed.value, 140105);
    assert_eq!(parsed.consumed, 12);
    assert_eq!(try_parse_u64(b"-0000".as_slice()).value, 0);
}

#[test]
fn sixty_four_bit_boundaries() {
    assert_eq!(try_parse_i64(b"9223372036854775807".as_slice()).value, i64::MAX);
    assert_eq!(
        try_parse_i64(b"-9223372036854775809".as_slice()).status,
        ParseStatus::Overflow
    );
    assert_eq!(
        try_parse_u64(b"18446744073709551616".as_slice()).status,
        ParseStatus::Overflow
    );
    assert_eq!(try_parse_u32(b"-7".as_slice()).status, ParseStatus::Overflow);
}

#[test]
fn token_reads_convert_status_to_errors() {
    let mut tokenizer = Tokenizer::new(b"[3000000000, -1, 2.0, 2.01, \"7\"]".as_slice());
    tokenizer.read_begin_array().unwrap();
    assert!(matches!(
        tokenizer.read_i32(),
        Err(JsonError::NumberOverflow { target: "i32", .. })
    ));
    tokenizer.read_entry_separator().unwrap();
    assert!(matches!(
        tokenizer.read_u64(),
        Err(JsonError::NumberOverflow { target: "u64", .. })
    ));
    tokenizer.read_entry_separator().unwrap();
    assert_eq!(tokenizer.read_u32().unwrap(), 2);
    tokenizer.read_entry_separator().unwrap();
    assert!(matches!(
        tokenizer.read_i64(),
        Err(JsonError::FractionalNumber { .. })
    ));
    tokenizer.read_entry_separator().unwrap();
    assert!(matches!(
        tokenizer.read_i32(),
        Err(JsonError::UnexpectedToken { .. })
    ));
}

proptest! {
    #[test]
    fn any_i32_parses_exactly(value in any::<i32>()) {
        let text = value.to_string();
        let parsed = try_parse_i32(text.as_bytes());
        prop_assert!(parsed.is_ok());
        prop_assert_eq!(parsed.value, value);
        prop_assert_eq!(parsed.consumed, text.len());
        let units = utf16(&text);
        prop_assert_eq!(try_parse_i32(&units).value, value);
    }

    #[test]
    fn any_u64_parses_exactly(value in any::<u64>()) {
        let text = value.to_string();
        let parsed = try_parse_u64(text.as_bytes());
        prop_assert_eq!(parsed.status, ParseStatus::ParsingSuccessful);
        prop_assert_eq!(parsed.value, value);
    }

    #[test]
    fn out_of_range_i64_overflows_i32(value in any::<i64>()) {
        prop_assume!(i32::try_from(value).is_err());
        let parsed = try_parse_i32(value.to_string().as_bytes());
        prop_assert_eq!(parsed.status, ParseStatus::Overflow);
    }

    #[test]
    fn trailing_content_is_not_consumed(value in any::<i64>(), tail in "[^0-9]{0,4}") {
        let text = format!("{value}{tail}");
        let parsed = try_parse_i64(text.as_bytes());
        prop_assert_eq!(parsed.value, value);
        prop_assert_eq!(parsed.consumed, value.to_string().len());
    }
}
