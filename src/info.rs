// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! INFO: a semicolon-delimited list of `KEY` (flag) or `KEY=VALUE` pairs,
//! dispatched against the declared INFO field registry.

use std::{collections::HashMap, io::Read};

use crate::{
    array::Column,
    config::FieldSpec,
    context::ParserContext,
    error::ParseError,
    numeric,
    quote::{is_field_end, is_missing_token, is_one_of, is_record_end, COMMA, EQUALS, SEMICOLON},
};

/// Dispatches INFO key/value pairs against a declared field registry.
/// Unknown keys are skipped entirely (their value, if any, is discarded
/// unparsed); this is the one place in the grammar where a whole value can
/// be thrown away rather than stored field-by-field, since INFO is the only
/// section whose key set is open-ended.
pub struct InfoParser<'a> {
    specs: &'a [FieldSpec],
    index: &'a HashMap<String, usize>,
}

impl<'a> InfoParser<'a> {
    pub fn new(specs: &'a [FieldSpec], index: &'a HashMap<String, usize>) -> Self {
        InfoParser { specs, index }
    }

    /// Parses the INFO field at the cursor into `columns`, one entry per
    /// declared field, in `specs`/`index` order.
    ///
    /// A bare `.` INFO field falls out of the same machinery as any other
    /// unknown, value-less key: it is looked up, not found, and discarded,
    /// leaving every column at its fill value exactly as an explicit empty
    /// field would.
    ///
    /// INFO is usually an interior field (terminated by TAB, with FORMAT and
    /// sample columns to follow), but when `n_samples == 0` it is the
    /// record's last field and is terminated by NEWLINE or end-of-stream
    /// instead; every terminator check below accepts either.
    pub fn parse<R: Read>(&self, ctx: &mut ParserContext<R>, columns: &mut [Column]) -> Result<(), ParseError> {
        debug_assert_eq!(columns.len(), self.specs.len());
        loop {
            ctx.temp_clear();
            while !is_one_of(ctx.c, &[EQUALS, SEMICOLON]) && !is_field_end(ctx.c) && !is_record_end(ctx.c) {
                ctx.temp_append(ctx.c);
                ctx.getc()?;
            }
            ctx.check_overflow("INFO");
            let found = std::str::from_utf8(ctx.temp()).ok().and_then(|key| self.index.get(key)).copied();

            if ctx.c == EQUALS {
                ctx.getc()?;
                match found {
                    Some(i) => self.parse_value(ctx, &self.specs[i], &mut columns[i])?,
                    None => skip_value(ctx)?,
                }
            } else if let Some(i) = found {
                match &mut columns[i] {
                    Column::Bool(a) => a.set(&[ctx.chunk_variant_index], true),
                    _ => ctx.warn("INFO", format!("{}: flag-style key on a non-boolean field", self.specs[i].name)),
                }
            }

            match ctx.c {
                SEMICOLON => {
                    ctx.getc()?;
                    continue;
                }
                c if is_field_end(c) || is_record_end(c) => break,
                c => {
                    return Err(ParseError::UnreachableState {
                        variant_index: ctx.variant_index,
                        state: format!("INFO key loop exited on byte {c:#04x}"),
                    })
                }
            }
        }
        eat_field_end(ctx)
    }

    /// Parses a (possibly comma-delimited, for `number > 1`) value after the
    /// `=` of a recognized key, writing up to `spec.number` entries and
    /// warning once if more were present (mirrors `fields::parse_alt`'s
    /// overflow handling).
    fn parse_value<R: Read>(&self, ctx: &mut ParserContext<R>, spec: &FieldSpec, column: &mut Column) -> Result<(), ParseError> {
        let row = ctx.chunk_variant_index;
        let mut sub_index: u16 = 0;
        ctx.temp_clear();
        loop {
            match ctx.c {
                COMMA => {
                    self.store_value(ctx, spec, column, row, sub_index);
                    sub_index += 1;
                    ctx.temp_clear();
                    ctx.getc()?;
                }
                c if c == SEMICOLON || is_field_end(c) || is_record_end(c) => {
                    self.store_value(ctx, spec, column, row, sub_index);
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

    fn store_value<R: Read>(&self, ctx: &mut ParserContext<R>, spec: &FieldSpec, column: &mut Column, row: usize, sub_index: u16) {
        ctx.check_overflow("INFO");
        if sub_index >= spec.number {
            if sub_index == spec.number {
                ctx.warn("INFO", format!("{}: more than {} values, extra ones dropped", spec.name, spec.number));
            }
            return;
        }
        if is_missing_token(ctx.temp()) {
            return;
        }
        let idx: Vec<usize> = if spec.number == 1 { vec![row] } else { vec![row, sub_index as usize] };
        match column {
            Column::I8(a) => self.store_int(ctx, spec, &idx, |v| numeric::narrow_i64(v), a),
            Column::I16(a) => self.store_int(ctx, spec, &idx, |v| numeric::narrow_i64(v), a),
            Column::I32(a) => self.store_int(ctx, spec, &idx, |v| numeric::narrow_i64(v), a),
            Column::I64(a) => self.store_int(ctx, spec, &idx, Some, a),
            Column::F32(a) => match ctx.temp_to_double() {
                Some(v) => a.set(&idx, v as f32),
                None => ctx.warn("INFO", format!("{}: could not parse float", spec.name)),
            },
            Column::F64(a) => match ctx.temp_to_double() {
                Some(v) => a.set(&idx, v),
                None => ctx.warn("INFO", format!("{}: could not parse float", spec.name)),
            },
            Column::Bool(_) => ctx.warn("INFO", format!("{}: boolean field given an explicit value", spec.name)),
            Column::Bytes(a) => {
                if a.write(&idx, ctx.temp()) {
                    ctx.warn("INFO", format!("{}: value truncated to configured itemsize", spec.name));
                }
            }
        }
    }

    fn store_int<R: Read, T: Copy>(
        &self,
        ctx: &mut ParserContext<R>,
        spec: &FieldSpec,
        idx: &[usize],
        narrow: impl FnOnce(i64) -> Option<T>,
        a: &mut crate::array::Array<T>,
    ) {
        match ctx.temp_to_long().and_then(narrow) {
            Some(v) => a.set(idx, v),
            None => ctx.warn("INFO", format!("{}: could not parse integer", spec.name)),
        }
    }
}

fn skip_value<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    while !is_one_of(ctx.c, &[SEMICOLON]) && !is_field_end(ctx.c) && !is_record_end(ctx.c) {
        ctx.getc()?;
    }
    Ok(())
}

#[inline]
fn eat_field_end<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    if ctx.c == crate::quote::TAB {
        ctx.getc()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        array::{Array, ByteArray, Shape},
        config::StorageType,
    };

    fn ctx_for(input: &'static [u8]) -> ParserContext<&'static [u8]> {
        let mut ctx = ParserContext::new(input, 64, 64, 1, 4, 2);
        ctx.getc().unwrap();
        ctx
    }

    fn columns_for(specs: &[FieldSpec]) -> Vec<Column> {
        specs
            .iter()
            .map(|spec| match spec.ty {
                StorageType::Int32 if spec.number == 1 => Column::I32(Array::new(Shape::new([4]), -1)),
                StorageType::Int32 => Column::I32(Array::new(Shape::new([4, spec.number as usize]), -1)),
                StorageType::Boolean => Column::Bool(Array::new(Shape::new([4]), false)),
                StorageType::FixedString { itemsize } => Column::Bytes(ByteArray::new(Shape::new([4]), itemsize)),
                _ => unreachable!("test fixture only covers Int32/Boolean/FixedString"),
            })
            .collect()
    }

    #[test]
    fn parses_scalar_int_and_flag() {
        let specs = vec![FieldSpec::new("DP", StorageType::Int32, 1), FieldSpec::new("DB", StorageType::Boolean, 1)];
        let index: HashMap<_, _> = specs.iter().enumerate().map(|(i, s)| (s.name.clone(), i)).collect();
        let parser = InfoParser::new(&specs, &index);
        let mut ctx = ctx_for(b"DP=14;DB\t");
        let mut columns = columns_for(&specs);
        parser.parse(&mut ctx, &mut columns).unwrap();
        match &columns[0] {
            Column::I32(a) => assert_eq!(a.get(&[0]), 14),
            _ => panic!(),
        }
        match &columns[1] {
            Column::Bool(a) => assert!(a.get(&[0])),
            _ => panic!(),
        }
    }

    #[test]
    fn unknown_key_with_value_is_discarded() {
        let specs = vec![FieldSpec::new("DP", StorageType::Int32, 1)];
        let index: HashMap<_, _> = specs.iter().enumerate().map(|(i, s)| (s.name.clone(), i)).collect();
        let parser = InfoParser::new(&specs, &index);
        let mut ctx = ctx_for(b"NS=3;DP=14\t");
        let mut columns = columns_for(&specs);
        parser.parse(&mut ctx, &mut columns).unwrap();
        match &columns[0] {
            Column::I32(a) => assert_eq!(a.get(&[0]), 14),
            _ => panic!(),
        }
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn missing_field_leaves_fill_values() {
        let specs = vec![FieldSpec::new("DP", StorageType::Int32, 1)];
        let index: HashMap<_, _> = specs.iter().enumerate().map(|(i, s)| (s.name.clone(), i)).collect();
        let parser = InfoParser::new(&specs, &index);
        let mut ctx = ctx_for(b".\t");
        let mut columns = columns_for(&specs);
        parser.parse(&mut ctx, &mut columns).unwrap();
        match &columns[0] {
            Column::I32(a) => assert_eq!(a.get(&[0]), -1),
            _ => panic!(),
        }
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn multivalue_overflow_drops_extra() {
        let specs = vec![FieldSpec::new("AC", StorageType::Int32, 2)];
        let index: HashMap<_, _> = specs.iter().enumerate().map(|(i, s)| (s.name.clone(), i)).collect();
        let parser = InfoParser::new(&specs, &index);
        let mut ctx = ctx_for(b"AC=1,2,3\t");
        let mut columns = columns_for(&specs);
        parser.parse(&mut ctx, &mut columns).unwrap();
        match &columns[0] {
            Column::I32(a) => {
                assert_eq!(a.get(&[0, 0]), 1);
                assert_eq!(a.get(&[0, 1]), 2);
            }
            _ => panic!(),
        }
        assert_eq!(ctx.warnings.len(), 1);
    }
}
