// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! Delimiter constants and the missing-value convention shared by every
//! field, subfield, and value parser.

use crate::source::EOF;

pub const TAB: u8 = b'\t';
pub const NEWLINE: u8 = b'\n';
pub const COMMA: u8 = b',';
pub const COLON: u8 = b':';
pub const SEMICOLON: u8 = b';';
pub const SLASH: u8 = b'/';
pub const PIPE: u8 = b'|';
pub const EQUALS: u8 = b'=';
pub const DOT: u8 = b'.';

/// Bytes that terminate an interior (non-final) field: just TAB.
pub const FIELD_END: [u8; 1] = [TAB];

/// Bytes that terminate a record's last field: TAB never occurs there, but
/// NEWLINE or end-of-stream do. Kept as a named set for readability at call
/// sites even though it collapses to a simple two-way match.
pub const RECORD_END: [u8; 2] = [NEWLINE, EOF];

/// Returns whether `c` appears in `set`. A `memchr` lookup against a small
/// fixed set reads the same as the direct multi-pattern match it replaces,
/// but keeps the delimiter sets declared once, as data, instead of repeated
/// as `b'a' | b'b' | ...` patterns at every call site.
#[inline]
pub fn is_one_of(c: u8, set: &[u8]) -> bool {
    memchr::memchr(c, set).is_some()
}

#[inline]
pub fn is_field_end(c: u8) -> bool {
    c == TAB
}

#[inline]
pub fn is_record_end(c: u8) -> bool {
    c == NEWLINE || c == EOF
}

#[inline]
pub fn is_terminator(c: u8) -> bool {
    is_field_end(c) || is_record_end(c)
}

/// Whether a just-finished token (the scratch buffer's contents) denotes an
/// explicit missing value: empty, or a single `.`, at any level (field,
/// subfield, or individual comma-separated value).
#[inline]
pub fn is_missing_token(token: &[u8]) -> bool {
    token.is_empty() || token == b"."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_missing_tokens() {
        assert!(is_missing_token(b""));
        assert!(is_missing_token(b"."));
        assert!(!is_missing_token(b".."));
        assert!(!is_missing_token(b"0"));
    }

    #[test]
    fn membership_lookup() {
        assert!(is_one_of(b';', &[COMMA, COLON, SEMICOLON]));
        assert!(!is_one_of(b'x', &[COMMA, COLON, SEMICOLON]));
    }
}
