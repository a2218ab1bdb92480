// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! FILTER: a comma-list of filter names, mapped to a one-hot row across a
//! declared filter set.

use std::{collections::HashMap, io::Read};

use crate::{
    array::Array,
    context::ParserContext,
    error::ParseError,
    quote::{is_field_end, is_one_of, COLON, COMMA, DOT, SEMICOLON},
};

/// Maps filter-name tokens to a one-hot row of `Array<bool>` columns, one
/// per configured name. `PASS` is never implicit: a `variants/FILTER_PASS`
/// column only appears if the caller requests `"PASS"` like any other name.
pub struct FilterParser {
    names: Vec<String>,
    index: HashMap<Vec<u8>, usize>,
}

impl FilterParser {
    pub fn new(names: &[String]) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_bytes().to_vec(), i))
            .collect();
        FilterParser {
            names: names.to_vec(),
            index,
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Parses the FILTER field at the cursor into `columns`, one boolean
    /// array per configured filter name, in the same order as
    /// [`FilterParser::names`].
    ///
    /// On explicit `.`, the row is left zeroed. Accepts `,`, `:`, and `;`
    /// interchangeably as token separators, matching real-world files that
    /// mix them.
    pub fn parse<R: Read>(&self, ctx: &mut ParserContext<R>, columns: &mut [Array<bool>]) -> Result<(), ParseError> {
        debug_assert_eq!(columns.len(), self.names.len());
        let row = ctx.chunk_variant_index;

        if ctx.c == DOT {
            ctx.getc()?;
            if is_field_end(ctx.c) || ctx.at_eof() {
                return eat(ctx);
            }
            ctx.temp_clear();
            ctx.temp_append(DOT);
        } else {
            ctx.temp_clear();
        }

        loop {
            match ctx.c {
                c if is_one_of(c, &[COMMA, COLON, SEMICOLON]) => {
                    self.store_token(ctx, columns, row);
                    ctx.temp_clear();
                    ctx.getc()?;
                }
                c if is_field_end(c) || ctx.at_eof() => {
                    self.store_token(ctx, columns, row);
                    break;
                }
                c => {
                    ctx.temp_append(c);
                    ctx.getc()?;
                }
            }
        }
        eat(ctx)
    }

    fn store_token<R: Read>(&self, ctx: &mut ParserContext<R>, columns: &mut [Array<bool>], row: usize) {
        ctx.check_overflow("FILTER");
        if ctx.temp().is_empty() {
            ctx.warn("FILTER", "empty filter token");
            return;
        }
        // Unknown tokens are silently discarded.
        if let Some(&i) = self.index.get(ctx.temp()) {
            columns[i].set(&[row], true);
        }
    }
}

#[inline]
fn eat<R: Read>(ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
    if ctx.c == crate::quote::TAB {
        ctx.getc()?;
    }
    Ok(())
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

    fn cols(n: usize) -> Vec<Array<bool>> {
        (0..n).map(|_| Array::<bool>::new(Shape::new([4]), false)).collect()
    }

    #[test]
    fn pass_and_qual_filters() {
        let parser = FilterParser::new(&["PASS".into(), "q10".into()]);

        let mut ctx = ctx_for(b"PASS\t");
        let mut columns = cols(2);
        parser.parse(&mut ctx, &mut columns).unwrap();
        assert!(columns[0].get(&[0]));
        assert!(!columns[1].get(&[0]));

        let mut ctx = ctx_for(b"q10\t");
        let mut columns = cols(2);
        parser.parse(&mut ctx, &mut columns).unwrap();
        assert!(!columns[0].get(&[0]));
        assert!(columns[1].get(&[0]));
    }

    #[test]
    fn explicit_missing_leaves_row_zeroed() {
        let parser = FilterParser::new(&["PASS".into()]);
        let mut ctx = ctx_for(b".\t");
        let mut columns = cols(1);
        parser.parse(&mut ctx, &mut columns).unwrap();
        assert!(!columns[0].get(&[0]));
    }

    #[test]
    fn unknown_filter_silently_discarded() {
        let parser = FilterParser::new(&["PASS".into()]);
        let mut ctx = ctx_for(b"mystery\t");
        let mut columns = cols(1);
        parser.parse(&mut ctx, &mut columns).unwrap();
        assert!(!columns[0].get(&[0]));
        assert!(ctx.warnings.is_empty());
    }

    #[test]
    fn multiple_filters_comma_separated() {
        let parser = FilterParser::new(&["PASS".into(), "q10".into(), "s50".into()]);
        let mut ctx = ctx_for(b"q10,s50\t");
        let mut columns = cols(3);
        parser.parse(&mut ctx, &mut columns).unwrap();
        assert!(!columns[0].get(&[0]));
        assert!(columns[1].get(&[0]));
        assert!(columns[2].get(&[0]));
    }
}
