// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! FORMAT: a colon-delimited list of per-sample subfield names, resolved
//! against the calldata registry into the record's dispatch vector: a
//! vector of [`DispatchTarget`]s into a fixed registry, built once per
//! FORMAT field rather than looked up by name during CALLDATA.

use std::{collections::HashMap, io::Read};

use crate::{
    context::{DispatchTarget, ParserContext},
    error::ParseError,
    quote::{is_field_end, is_record_end, COLON},
};

pub struct FormatParser<'a> {
    calldata_index: &'a HashMap<String, usize>,
    has_gt: bool,
}

impl<'a> FormatParser<'a> {
    pub fn new(calldata_index: &'a HashMap<String, usize>, has_gt: bool) -> Self {
        FormatParser { calldata_index, has_gt }
    }

    /// Parses the FORMAT field, replacing `ctx.dispatch` and
    /// `ctx.variant_n_formats` for the record about to enter CALLDATA.
    pub fn parse<R: Read>(&self, ctx: &mut ParserContext<R>) -> Result<(), ParseError> {
        ctx.dispatch.clear();
        ctx.variant_n_formats = 0;
        ctx.temp_clear();
        loop {
            match ctx.c {
                COLON => {
                    self.push(ctx);
                    ctx.temp_clear();
                    ctx.getc()?;
                }
                c if is_field_end(c) || is_record_end(c) || ctx.at_eof() => {
                    self.push(ctx);
                    break;
                }
                c => {
                    ctx.temp_append(c);
                    ctx.getc()?;
                }
            }
        }
        if ctx.c == crate::quote::TAB {
            ctx.getc()?;
        }
        Ok(())
    }

    fn push<R: Read>(&self, ctx: &mut ParserContext<R>) {
        let target = match std::str::from_utf8(ctx.temp()).ok() {
            Some("GT") if self.has_gt => Some(DispatchTarget::Gt),
            Some(key) => self.calldata_index.get(key).copied().map(DispatchTarget::Field),
            None => None,
        };
        ctx.dispatch.push(target);
        ctx.variant_n_formats += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx_for(input: &'static [u8]) -> ParserContext<&'static [u8]> {
        let mut ctx = ParserContext::new(input, 64, 64, 2, 4, 2);
        ctx.getc().unwrap();
        ctx
    }

    #[test]
    fn resolves_gt_and_known_field() {
        let mut index = HashMap::new();
        index.insert("DP".to_string(), 0usize);
        let parser = FormatParser::new(&index, true);
        let mut ctx = ctx_for(b"GT:DP\t0|0:14\n");
        parser.parse(&mut ctx).unwrap();
        assert_eq!(ctx.variant_n_formats, 2);
        assert_eq!(ctx.dispatch, vec![Some(DispatchTarget::Gt), Some(DispatchTarget::Field(0))]);
        assert_eq!(ctx.c, b'0');
    }

    #[test]
    fn unknown_format_key_is_null() {
        let index = HashMap::new();
        let parser = FormatParser::new(&index, true);
        let mut ctx = ctx_for(b"GT:XX\t");
        parser.parse(&mut ctx).unwrap();
        assert_eq!(ctx.dispatch, vec![Some(DispatchTarget::Gt), None]);
    }

    #[test]
    fn gt_without_configured_genotype_is_null() {
        let index = HashMap::new();
        let parser = FormatParser::new(&index, false);
        let mut ctx = ctx_for(b"GT\t");
        parser.parse(&mut ctx).unwrap();
        assert_eq!(ctx.dispatch, vec![None]);
    }
}
