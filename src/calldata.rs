// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! CALLDATA: per-sample, colon-delimited subfields whose structure was
//! announced by the immediately preceding FORMAT field.
//!
// The outer loop here never looks a key up by name; it only ever walks
// `ctx.dispatch` by position, for branch-predictable, allocation-free
// dispatch per sample subfield.

use std::io::Read;

use crate::{
    array::Column,
    config::FieldSpec,
    context::{DispatchTarget, ParserContext},
    error::ParseError,
    numeric,
    quote::{is_field_end, is_missing_token, is_one_of, is_record_end, COLON, COMMA, NEWLINE, PIPE, SLASH},
};

/// Walks one record's sample columns, delegating each subfield to the
/// sub-parser the FORMAT dispatch vector names for its position.
pub struct CalldataParser<'a> {
    specs: &'a [FieldSpec],
}

impl<'a> CalldataParser<'a> {
    pub fn new(specs: &'a [FieldSpec]) -> Self {
        CalldataParser { specs }
    }

    /// `gt` is the genotype output column, if GT was configured.
    pub fn parse<R: Read>(&self, ctx: &mut ParserContext<R>, mut gt: Option<&mut Column>, columns: &mut [Column]) -> Result<(), ParseError> {
        debug_assert_eq!(columns.len(), self.specs.len());
        ctx.sample_index = 0;
        ctx.format_index = 0;
        loop {
            match ctx.c {
                c if is_record_end(c) || ctx.at_eof() => {
                    if ctx.c == NEWLINE {
                        ctx.getc()?;
                    }
                    return Ok(());
                }
                crate::quote::TAB => {
                    ctx.getc()?;
                    ctx.sample_index += 1;
                    ctx.format_index = 0;
                }
                COLON => {
                    ctx.getc()?;
                    ctx.format_index += 1;
                }
                _ => self.dispatch_subfield(ctx, &mut gt, columns)?,
            }
        }
    }

    fn dispatch_subfield<R: Read>(&self, ctx: &mut ParserContext<R>, gt: &mut Option<&mut Column>, columns: &mut [Column]) -> Result<(), ParseError> {
        if ctx.sample_index >= ctx.n_samples {
            if ctx.sample_index == ctx.n_samples && ctx.format_index == 0 {
                ctx.warn("calldata", "more sample columns than declared n_samples, extra ones dropped");
            }
            return skip_subfield(ctx);
        }
        let target = if ctx.format_index < ctx.variant_n_formats {
            ctx.dispatch[ctx.format_index]
        } else {
            None
        };
        match target {
            Some(DispatchTarget::Gt) => match gt.as_deref_mut() {
                Some(column) => self.parse_genotype(ctx, column)?,
                None => skip_subfield(ctx)?,
            },
            Some(DispatchTarget::Field(i)) => self.parse_sample_value(ctx, &self.specs[i], &mut columns[i])?,
            None => skip_subfield(ctx)?,
        }
        Ok(())
    }

    /// Genotype alleles are separated by `/` or `|`, each an integer or `.`
    /// for missing, written into the first `ploidy` slots.
    fn parse_genotype<R: Read>(&self, ctx: &mut ParserContext<R>, column: &mut Column) -> Result<(), ParseError> {
        let (variant, sample, ploidy) = (ctx.chunk_variant_index, ctx.sample_index, ctx.ploidy);
        let mut allele_index = 0usize;
        ctx.temp_clear();
        loop {
            match ctx.c {
                SLASH | PIPE => {
                    self.store_allele(ctx, column, variant, sample, allele_index, ploidy);
                    allele_index += 1;
                    ctx.temp_clear();
                    ctx.getc()?;
                }
                c if c == COLON || is_field_end(c) || is_record_end(c) || ctx.at_eof() => {
                    self.store_allele(ctx, column, variant, sample, allele_index, ploidy);
                    break;
                }
                c => {
                    ctx.temp_append(c);
                    ctx.getc()?;
                }
            }
        }
        Ok(())
    }

    fn store_allele<R: Read>(&self, ctx: &mut ParserContext<R>, column: &mut Column, variant: usize, sample: usize, allele_index: usize, ploidy: usize) {
        ctx.check_overflow("GT");
        if allele_index >= ploidy {
            if allele_index == ploidy {
                ctx.warn("GT", format!("more than {ploidy} alleles, extra ones dropped"));
            }
            return;
        }
        if is_missing_token(ctx.temp()) {
            return;
        }
        let idx = [variant, sample, allele_index];
        match column {
            Column::I8(a) => store_narrowed(ctx, "GT", &idx, a),
            Column::I16(a) => store_narrowed(ctx, "GT", &idx, a),
            Column::I32(a) => store_narrowed(ctx, "GT", &idx, a),
            Column::I64(a) => match ctx.temp_to_long() {
                Some(v) => a.set(&idx, v),
                None => ctx.warn("GT", "could not parse allele"),
            },
            _ => ctx.warn("GT", "GT configured with a non-integer storage type"),
        }
    }

    /// Comma-separated values (or byte strings) up to the declared
    /// cardinality, overflow dropped with one warning.
    fn parse_sample_value<R: Read>(&self, ctx: &mut ParserContext<R>, spec: &FieldSpec, column: &mut Column) -> Result<(), ParseError> {
        let (variant, sample) = (ctx.chunk_variant_index, ctx.sample_index);
        let mut sub_index: u16 = 0;
        ctx.temp_clear();
        loop {
            match ctx.c {
                COMMA => {
                    self.store_sample_value(ctx, spec, column, variant, sample, sub_index);
                    sub_index += 1;
                    ctx.temp_clear();
                    ctx.getc()?;
                }
                c if c == COLON || is_field_end(c) || is_record_end(c) || ctx.at_eof() => {
                    self.store_sample_value(ctx, spec, column, variant, sample, sub_index);
                    break;
                }
                c => {
                    ctx.temp_append(c);
                    ctx.getc()?;
                }
            }
        }
        Ok(())
    }

    fn store_sample_value<R: Read>(&self, ctx: &mut ParserContext<R>, spec: &FieldSpec, column: &mut Column, variant: usize, sample: usize, sub_index: u16) {
        ctx.check_overflow("calldata");
        if sub_index >= spec.number {
            if sub_index == spec.number {
                ctx.warn("calldata", format!("{}: more than {} values, extra ones dropped", spec.name, spec.number));
            }
            return;
        }
        if is_missing_token(ctx.temp()) {
            return;
        }
        let idx: Vec<usize> = if spec.number == 1 {
            vec![variant, sample]
        } else {
            vec![variant, sample, sub_index as usize]
        };
        match column {
            Column::I8(a) => store_narrowed(ctx, "calldata", &idx, a),
            Column::I16(a) => store_narrowed(ctx, "calldata", &idx, a),
            Column::I32(a) => store_narrowed(ctx, "calldata", &idx, a),
            Column::I64(a) => match ctx.temp_to_long() {
                Some(v) => a.set(&idx, v),
                None => ctx.warn("calldata", format!("{}: could not parse integer", spec.name)),
            },
            Column::F32(a) => match ctx.temp_to_double() {
                Some(v) => a.set(&idx, v as f32),
                None => ctx.warn("calldata", format!("{}: could not parse float", spec.name)),
            },
            Column::F64(a) => match ctx.temp_to_double() {
                Some(v) => a.set(&idx, v),
                None => ctx.warn("calldata", format!("{}: could not parse float", spec.name)),
            },
            Column::Bool(_) => ctx.warn("calldata", format!("{}: boolean field given an explicit value", spec.name)),
            Column::Bytes(a) => {
                if a.write(&idx, ctx.temp()) {
                    ctx.warn("calldata", format!("{}: value truncated to configured itemsize", spec.name));
                }
            }
        }
    }
}

fn store_narrowed<R: Read, T>(ctx: &mut ParserContext<R>, field: &'static str, idx: &[usize], a: &mut crate::array::Array<T>)
where
    T: Copy + TryFrom<i64>,
{
    match ctx.temp_to_long().and_then(numeric::narrow_i64::<T>) {
        Some(v) => a.set(idx, v),
        None => ctx.warn(field, "could not parse integer"),
    }
}

fn skip_subfield<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    while !is_one_of(ctx.c, &[COLON]) && !is_field_end(ctx.c) && !is_record_end(ctx.c) && !ctx.at_eof() {
        ctx.getc()?;
    }
    Ok(())
}
