// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! Shared mutable parsing state: the one-byte lookahead, the reusable
//! scratch buffer, the running counters, and the per-record FORMAT dispatch
//! vector.

use std::io::Read;

use crate::{
    error::{ParseError, Warning},
    source::{ByteSource, EOF},
};

/// What a FORMAT-declared subfield position resolves to for the duration
/// of one record's CALLDATA section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchTarget {
    /// The specialized genotype sub-parser.
    Gt,
    /// A registered calldata field, by index into its declared-field list.
    Field(usize),
}

/// Shared, reused state for one parsing session. Owns the byte source, the
/// current lookahead byte, the scratch buffer tokens are accumulated into,
/// and the counters and dispatch vector that make sense of a FORMAT-
/// declared record.
pub struct ParserContext<R> {
    source: ByteSource<R>,
    /// The current lookahead byte. [`EOF`] once the stream is exhausted.
    pub c: u8,

    scratch: Vec<u8>,
    scratch_capacity: usize,
    /// Whether the token currently in `scratch` was clamped because it
    /// exceeded `scratch_capacity`. Reset on [`ParserContext::temp_clear`].
    scratch_overflowed: bool,

    pub variant_index: u64,
    pub chunk_variant_index: usize,
    pub sample_index: usize,
    pub format_index: usize,

    /// Per-record FORMAT dispatch vector: for each subfield position
    /// declared by the current record's FORMAT, which calldata sub-parser
    /// to use, or `None` to skip it. Invalidated (cleared) before the next
    /// FORMAT is parsed.
    pub dispatch: Vec<Option<DispatchTarget>>,
    /// The number of FORMAT keys declared for the current record.
    pub variant_n_formats: usize,

    pub n_samples: usize,
    pub chunk_length: usize,
    pub ploidy: usize,

    pub warnings: Vec<Warning>,
}

impl<R: Read> ParserContext<R> {
    pub fn new(reader: R, input_buffer_size: usize, temp_buffer_size: usize, n_samples: usize, chunk_length: usize, ploidy: usize) -> Self {
        ParserContext {
            source: ByteSource::new(reader, input_buffer_size),
            c: EOF,
            scratch: Vec::with_capacity(temp_buffer_size),
            scratch_capacity: temp_buffer_size,
            scratch_overflowed: false,
            variant_index: 0,
            chunk_variant_index: 0,
            sample_index: 0,
            format_index: 0,
            dispatch: Vec::new(),
            variant_n_formats: 0,
            n_samples,
            chunk_length,
            ploidy,
            warnings: Vec::new(),
        }
    }

    /// Reads the next byte from the source into `self.c`.
    #[inline]
    pub fn getc(&mut self) -> Result<(), ParseError> {
        self.c = self.source.next_byte().map_err(|source| ParseError::Io {
            variant_index: self.variant_index,
            source,
        })?;
        Ok(())
    }

    pub fn at_eof(&self) -> bool {
        self.c == EOF
    }

    #[inline]
    pub fn temp_clear(&mut self) {
        self.scratch.clear();
        self.scratch_overflowed = false;
    }

    /// Appends a byte to the scratch buffer, silently clamping (dropping
    /// the byte) once `temp_buffer_size` is reached.
    #[inline]
    pub fn temp_append(&mut self, b: u8) {
        if self.scratch.len() < self.scratch_capacity {
            self.scratch.push(b);
        } else {
            self.scratch_overflowed = true;
        }
    }

    pub fn temp(&self) -> &[u8] {
        &self.scratch
    }

    pub fn temp_overflowed(&self) -> bool {
        self.scratch_overflowed
    }

    /// Parses the scratch buffer as a signed base-10 integer. Empty or a
    /// single `.` is "missing" (`Ok(None)`); anything else malformed is
    /// also treated as missing, since the caller is responsible for
    /// emitting the appropriate warning.
    pub fn temp_to_long(&self) -> Option<i64> {
        crate::numeric::parse_i64(&self.scratch)
    }

    /// Parses the scratch buffer as a floating-point value, see
    /// [`ParserContext::temp_to_long`].
    pub fn temp_to_double(&self) -> Option<f64> {
        crate::numeric::parse_f64(&self.scratch)
    }

    /// Records a recoverable anomaly, carrying the current variant index and
    /// the offending scratch contents.
    pub fn warn(&mut self, field: &'static str, message: impl Into<String>) {
        use bstr::ByteSlice;
        let message = message.into();
        let message = if self.scratch.is_empty() {
            message
        } else {
            format!("{message} (scratch: {:?})", self.scratch.as_bstr())
        };
        self.warnings.push(Warning::new(self.variant_index, field, message));
    }

    /// Warns if the token that just finished accumulating in the scratch
    /// buffer was clamped because it exceeded `temp_buffer_size`. Callers
    /// invoke this unconditionally once a token is complete (before the next
    /// `temp_clear`), independent of whether the (now truncated) token goes
    /// on to parse successfully: a value can overflow scratch and still
    /// parse as a different, wrong value, which must still be warned about.
    pub fn check_overflow(&mut self, field: &'static str) {
        if self.scratch_overflowed {
            self.warnings.push(Warning::new(
                self.variant_index,
                field,
                format!("token exceeded scratch buffer capacity ({} bytes) and was truncated", self.scratch_capacity),
            ));
        }
    }

    /// Takes the accumulated warnings, leaving an empty sink for the next
    /// chunk.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(input: &'static [u8]) -> ParserContext<&'static [u8]> {
        ParserContext::new(input, 64, 16, 2, 2, 2)
    }

    #[test]
    fn getc_advances_and_hits_eof() {
        let mut c = ctx(b"ab");
        c.getc().unwrap();
        assert_eq!(c.c, b'a');
        c.getc().unwrap();
        assert_eq!(c.c, b'b');
        c.getc().unwrap();
        assert!(c.at_eof());
    }

    #[test]
    fn scratch_accumulates_and_parses() {
        let mut c = ctx(b"");
        c.temp_clear();
        for b in b"1234" {
            c.temp_append(*b);
        }
        assert_eq!(c.temp_to_long(), Some(1234));
    }

    #[test]
    fn scratch_overflow_clamps_and_flags() {
        let mut c = ParserContext::new(&b""[..], 64, 4, 2, 2, 2);
        c.temp_clear();
        for b in b"123456" {
            c.temp_append(*b);
        }
        assert_eq!(c.temp(), b"1234");
        assert!(c.temp_overflowed());
    }

    #[test]
    fn missing_value_is_none() {
        let mut c = ctx(b"");
        c.temp_clear();
        assert_eq!(c.temp_to_long(), None);
        c.temp_append(b'.');
        assert_eq!(c.temp_to_long(), None);
    }
}
