// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! Per-width numeric plumbing shared by the INFO and calldata sub-parsers.
//!
//! A small `NumericFill` trait plus one `paste!`-driven macro invocation
//! generates the width-to-constructor table, rather than hand-writing
//! `Array::<i8>::new(...)`, `Array::<i16>::new(...)`, ... six times over.

use paste::paste;

use crate::array::{Array, Shape};

/// The fill value type-appropriate for a numeric storage type: `-1` for
/// integers, NaN for floats (no integer-style sentinel exists for floats,
/// and NaN is the convention used throughout variant-calling tooling for
/// "value absent").
pub trait NumericFill: Copy + PartialEq + 'static {
    const FILL: Self;
}

macro_rules! impl_int_fill {
    ($($t:ty),* $(,)?) => {
        $(impl NumericFill for $t {
            const FILL: $t = -1;
        })*
    };
}

macro_rules! impl_float_fill {
    ($($t:ty),* $(,)?) => {
        $(impl NumericFill for $t {
            const FILL: $t = <$t>::NAN;
        })*
    };
}

impl_int_fill!(i8, i16, i32, i64);
impl_float_fill!(f32, f64);

impl NumericFill for bool {
    const FILL: bool = false;
}

macro_rules! numeric_array_ctors {
    ($($t:ty),* $(,)?) => {
        $(paste! {
            /// Allocates a fresh, fully-filled `Array<
            #[doc = stringify!($t)]
            /// >` of the given shape.
            pub fn [<new_ $t _array>](shape: Shape) -> Array<$t> {
                Array::new(shape, <$t as NumericFill>::FILL)
            }
        })*
    };
}

numeric_array_ctors!(i8, i16, i32, i64, f32, f64, bool);

/// Parses an ASCII decimal (optionally signed) integer from `bytes`,
/// returning `None` on any non-digit, overflow, or empty input.
pub fn parse_i64(bytes: &[u8]) -> Option<i64> {
    if bytes.is_empty() || bytes == b"." {
        return None;
    }
    let (neg, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        Some((b'+', rest)) => (false, rest),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return None;
    }
    let mut value: i64 = 0;
    for &b in digits {
        if !b.is_ascii_digit() {
            return None;
        }
        value = value.checked_mul(10)?.checked_add((b - b'0') as i64)?;
    }
    Some(if neg { -value } else { value })
}

/// Parses an ASCII floating-point literal from `bytes`, returning `None` on
/// malformed or empty input.
pub fn parse_f64(bytes: &[u8]) -> Option<f64> {
    if bytes.is_empty() || bytes == b"." {
        return None;
    }
    // The grammar this crate parses is 7-bit ASCII, so a byte-to-str
    // reinterpretation is always valid UTF-8.
    let s = std::str::from_utf8(bytes).ok()?;
    s.parse::<f64>().ok()
}

/// Casts a parsed `i64` down to a narrower integer width, returning `None`
/// if the value doesn't fit. Callers treat `None` the same as an
/// unparseable value and warn.
pub fn narrow_i64<T: TryFrom<i64>>(value: i64) -> Option<T> {
    T::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_signed_integers() {
        assert_eq!(parse_i64(b"14370"), Some(14370));
        assert_eq!(parse_i64(b"-5"), Some(-5));
        assert_eq!(parse_i64(b""), None);
        assert_eq!(parse_i64(b"."), None);
        assert_eq!(parse_i64(b"12x"), None);
    }

    #[test]
    fn parses_floats() {
        assert_eq!(parse_f64(b"29"), Some(29.0));
        assert_eq!(parse_f64(b"3.14"), Some(3.14));
        assert_eq!(parse_f64(b"."), None);
        assert_eq!(parse_f64(b""), None);
    }

    #[test]
    fn fill_values() {
        assert_eq!(i32::FILL, -1);
        assert!(f32::FILL.is_nan());
        assert_eq!(bool::FILL, false);
    }

    #[test]
    fn narrowing_rejects_out_of_range() {
        assert_eq!(narrow_i64::<i8>(200), None);
        assert_eq!(narrow_i64::<i8>(100), Some(100i8));
    }
}
