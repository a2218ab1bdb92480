// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! The fixed-column field parsers: CHROM, POS, ID, REF, ALT, QUAL, and the
//! shared skip-field parser for unrequested columns.
//!
// One function per fixed syntactic position, each consuming through and
// past its own terminator. Colocated in one module (rather than
// `fields/chrom.rs`, `fields/pos.rs`, ...) since every function here shares
// the same `&mut ParserContext` signature and splitting them apart would
// scatter the dispatch table without adding clarity.

use std::io::Read;

use crate::{
    array::{Array, ByteArray},
    context::ParserContext,
    error::ParseError,
    quote::{is_field_end, is_missing_token, COMMA, TAB},
};

/// Consumes an interior field's terminating TAB.
#[inline]
fn eat_field_end<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    debug_assert!(is_field_end(ctx.c) || ctx.at_eof());
    if ctx.c == TAB {
        ctx.getc()?;
    }
    Ok(())
}

/// CHROM, ID, REF: copy raw bytes into the fixed-width slot at the current
/// `chunk_variant_index`, silently truncating overlong values.
pub fn parse_string_field<R: Read>(
    ctx: &mut ParserContext<R>,
    field: &'static str,
    buf: &mut ByteArray,
) -> Result<(), ParseError> {
    ctx.temp_clear();
    while !is_field_end(ctx.c) && !ctx.at_eof() {
        ctx.temp_append(ctx.c);
        ctx.getc()?;
    }
    ctx.check_overflow(field);
    let idx = [ctx.chunk_variant_index];
    if buf.write(&idx, ctx.temp()) {
        ctx.warn(field, "value truncated to configured itemsize");
    }
    eat_field_end(ctx)
}

/// Like [`parse_string_field`], but discards the bytes instead of storing
/// them, for fixed columns the caller did not request.
pub fn skip_field<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    while !is_field_end(ctx.c) && !ctx.at_eof() {
        ctx.getc()?;
    }
    eat_field_end(ctx)
}

/// POS: parse as a signed 32-bit integer. An empty or `.` value leaves the
/// fill value (`-1`) without warning; anything else unparseable also leaves
/// the fill value but warns.
pub fn parse_pos<R: Read>(ctx: &mut ParserContext<R>, buf: &mut Array<i32>) -> Result<(), ParseError> {
    ctx.temp_clear();
    while !is_field_end(ctx.c) && !ctx.at_eof() {
        ctx.temp_append(ctx.c);
        ctx.getc()?;
    }
    ctx.check_overflow("POS");
    match ctx.temp_to_long() {
        Some(v) => match i32::try_from(v) {
            Ok(v) => buf.set(&[ctx.chunk_variant_index], v),
            Err(_) => ctx.warn("POS", format!("value {v} out of range for i32")),
        },
        None if is_missing_token(ctx.temp()) => {}
        None => ctx.warn("POS", "could not parse integer"),
    }
    eat_field_end(ctx)
}

/// QUAL: parse as a floating-point value; empty or `.` leaves the fill
/// value (NaN).
pub fn parse_qual<R: Read>(ctx: &mut ParserContext<R>, buf: &mut Array<f32>) -> Result<(), ParseError> {
    ctx.temp_clear();
    while !is_field_end(ctx.c) && !ctx.at_eof() {
        ctx.temp_append(ctx.c);
        ctx.getc()?;
    }
    ctx.check_overflow("QUAL");
    match ctx.temp_to_double() {
        Some(v) => buf.set(&[ctx.chunk_variant_index], v as f32),
        None if is_missing_token(ctx.temp()) => {}
        None => ctx.warn("QUAL", "could not parse float"),
    }
    eat_field_end(ctx)
}

/// ALT: comma-delimited list of alternate alleles, stored in a
/// `(chunk_len, number)` fixed-width byte matrix. Values past `number`
/// alternates are silently dropped; overlong strings are truncated.
pub fn parse_alt<R: Read>(ctx: &mut ParserContext<R>, buf: &mut ByteArray, number: u16) -> Result<(), ParseError> {
    let row = ctx.chunk_variant_index;
    let mut alt_index: u16 = 0;
    ctx.temp_clear();
    loop {
        match ctx.c {
            COMMA => {
                flush_alt_slot(ctx, buf, row, alt_index, number);
                alt_index += 1;
                ctx.temp_clear();
                ctx.getc()?;
            }
            c if is_field_end(c) || ctx.at_eof() => {
                flush_alt_slot(ctx, buf, row, alt_index, number);
                break;
            }
            c => {
                ctx.temp_append(c);
                ctx.getc()?;
            }
        }
    }
    eat_field_end(ctx)
}

fn flush_alt_slot<R: Read>(ctx: &mut ParserContext<R>, buf: &mut ByteArray, row: usize, alt_index: u16, number: u16) {
    ctx.check_overflow("ALT");
    if alt_index >= number {
        if alt_index == number {
            ctx.warn("ALT", format!("more than {number} alternate alleles, extra ones dropped"));
        }
        return;
    }
    if is_missing_token(ctx.temp()) {
        return;
    }
    let idx = [row, alt_index as usize];
    if buf.write(&idx, ctx.temp()) {
        ctx.warn("ALT", "alternate allele truncated to configured itemsize");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::Shape;

    fn ctx_for(input: &'static [u8]) -> ParserContext<&'static [u8]> {
        let mut ctx = ParserContext::new(input, 64, 64, 1, 4, 2);
        ctx.getc().unwrap();
        ctx
    }

    #[test]
    fn parses_chrom() {
        let mut ctx = ctx_for(b"20\trest");
        let mut buf = ByteArray::new(Shape::new([4]), 8);
        parse_string_field(&mut ctx, "CHROM", &mut buf).unwrap();
        assert_eq!(buf.slot(&[0]), b"20\0\0\0\0\0\0");
        assert_eq!(ctx.c, b'r');
    }

    #[test]
    fn truncates_overlong_chrom() {
        let mut ctx = ctx_for(b"chr_super_long_name\t");
        let mut buf = ByteArray::new(Shape::new([4]), 4);
        parse_string_field(&mut ctx, "CHROM", &mut buf).unwrap();
        assert_eq!(buf.slot(&[0]), b"chr_");
        assert_eq!(ctx.warnings.len(), 1);
    }

    #[test]
    fn parses_pos() {
        let mut ctx = ctx_for(b"14370\t");
        let mut buf = Array::<i32>::new(Shape::new([4]), -1);
        parse_pos(&mut ctx, &mut buf).unwrap();
        assert_eq!(buf.get(&[0]), 14370);
    }

    #[test]
    fn missing_pos_keeps_fill_without_warning() {
        let mut ctx = ctx_for(b"\t");
        let mut buf = Array::<i32>::new(Shape::new([4]), -1);
        parse_pos(&mut ctx, &mut buf).unwrap();
        assert_eq!(buf.get(&[0]), -1);
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn overflowing_pos_still_warns_even_though_it_parses() {
        // temp_buffer_size = 4 clamps "123456789" to "1234", which parses
        // fine as 1234, a silently wrong value unless the overflow itself
        // is warned about independent of whether parsing later succeeds.
        let mut ctx = ParserContext::new(&b"123456789\t"[..], 64, 4, 1, 4, 2);
        ctx.getc().unwrap();
        let mut buf = Array::<i32>::new(Shape::new([4]), -1);
        parse_pos(&mut ctx, &mut buf).unwrap();
        assert_eq!(buf.get(&[0]), 1234);
        assert_eq!(ctx.warnings.len(), 1);
        assert!(ctx.warnings[0].message.contains("exceeded scratch buffer capacity"));
    }

    #[test]
    fn parses_qual_missing() {
        let mut ctx = ctx_for(b".\t");
        let mut buf = Array::<f32>::new(Shape::new([4]), f32::NAN);
        parse_qual(&mut ctx, &mut buf).unwrap();
        assert!(buf.get(&[0]).is_nan());
    }

    #[test]
    fn parses_alt_overflow_drops_extra() {
        let mut ctx = ctx_for(b"A,C,G,T\t");
        let mut buf = ByteArray::new(Shape::new([4, 3]), 1);
        parse_alt(&mut ctx, &mut buf, 3).unwrap();
        assert_eq!(buf.slot(&[0, 0]), b"A");
        assert_eq!(buf.slot(&[0, 1]), b"C");
        assert_eq!(buf.slot(&[0, 2]), b"G");
        assert_eq!(ctx.warnings.len(), 1);
    }
}
