// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! The top-level record state machine: sequences the fixed-column parsers,
//! then FILTER, INFO, FORMAT, and CALLDATA, and finalizes chunks at the
//! configured boundary.

use std::io::Read;

use crate::{
    array::{Array, ByteArray, Chunk, Column},
    calldata::CalldataParser,
    config::{calldata_shape, field_shape, gt_shape, Config},
    context::ParserContext,
    error::PResult,
    fields,
    filter::FilterParser,
    format::FormatParser,
    info::InfoParser,
    numeric,
    quote::NEWLINE,
};

/// Drives one parsing session end to end, yielding fixed-length chunks via
/// repeated calls to [`Driver::next_chunk`] and a final partial chunk (if
/// any records remain) once the underlying reader is exhausted.
pub struct Driver<R> {
    ctx: ParserContext<R>,
    cfg: Config,

    chrom: Option<ByteArray>,
    id: Option<ByteArray>,
    reference: Option<ByteArray>,
    alt: Option<ByteArray>,
    pos: Option<Array<i32>>,
    qual: Option<Array<f32>>,
    filters: Vec<Array<bool>>,
    info: Vec<Column>,
    gt: Option<Column>,
    calldata: Vec<Column>,

    exhausted: bool,
}

impl<R: Read> Driver<R> {
    pub fn new(reader: R, cfg: Config) -> PResult<Self> {
        let chunk_length = cfg.chunk_length;
        let n_samples = cfg.n_samples;

        let chrom = cfg.chrom.map(|itemsize| ByteArray::new(field_shape(chunk_length, 1), itemsize));
        let id = cfg.id.map(|itemsize| ByteArray::new(field_shape(chunk_length, 1), itemsize));
        let reference = cfg.reference.map(|itemsize| ByteArray::new(field_shape(chunk_length, 1), itemsize));
        let alt = cfg
            .alt
            .map(|(itemsize, number)| ByteArray::new(field_shape(chunk_length, number), itemsize));
        let pos = cfg.pos.then(|| numeric::new_i32_array(field_shape(chunk_length, 1)));
        let qual = cfg.qual.then(|| numeric::new_f32_array(field_shape(chunk_length, 1)));
        let filters = cfg.filters.iter().map(|_| numeric::new_bool_array(field_shape(chunk_length, 1))).collect();
        let info = cfg.info.iter().map(|spec| spec.ty.alloc(field_shape(chunk_length, spec.number))).collect();
        let gt = cfg.gt.map(|ty| ty.alloc(gt_shape(chunk_length, n_samples, cfg.ploidy)));
        let calldata = cfg
            .calldata
            .iter()
            .map(|spec| spec.ty.alloc(calldata_shape(chunk_length, n_samples, spec.number)))
            .collect();

        let mut ctx = ParserContext::new(reader, cfg.input_buffer_size, cfg.temp_buffer_size, n_samples, chunk_length, cfg.ploidy);
        ctx.getc()?;

        Ok(Driver {
            ctx,
            cfg,
            chrom,
            id,
            reference,
            alt,
            pos,
            qual,
            filters,
            info,
            gt,
            calldata,
            exhausted: false,
        })
    }

    /// Returns the next emitted chunk, the final partial chunk once the
    /// reader is exhausted and records remain unflushed, or `None` once
    /// everything has been handed out.
    pub fn next_chunk(&mut self) -> PResult<Option<Chunk>> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            if self.ctx.at_eof() {
                self.exhausted = true;
                return Ok(if self.ctx.chunk_variant_index == 0 {
                    None
                } else {
                    Some(self.finalize_chunk(self.ctx.chunk_variant_index))
                });
            }

            self.parse_record()?;
            self.ctx.variant_index += 1;
            self.ctx.chunk_variant_index += 1;

            if self.ctx.chunk_variant_index == self.cfg.chunk_length {
                let chunk = self.finalize_chunk(self.cfg.chunk_length);
                self.ctx.chunk_variant_index = 0;
                return Ok(Some(chunk));
            }
        }
    }

    /// Takes the warnings accumulated since the last call (or since the
    /// driver was created).
    pub fn take_warnings(&mut self) -> Vec<crate::error::Warning> {
        self.ctx.take_warnings()
    }

    fn parse_record(&mut self) -> PResult<()> {
        match &mut self.chrom {
            Some(buf) => fields::parse_string_field(&mut self.ctx, "CHROM", buf)?,
            None => fields::skip_field(&mut self.ctx)?,
        }
        match &mut self.pos {
            Some(buf) => fields::parse_pos(&mut self.ctx, buf)?,
            None => fields::skip_field(&mut self.ctx)?,
        }
        match &mut self.id {
            Some(buf) => fields::parse_string_field(&mut self.ctx, "ID", buf)?,
            None => fields::skip_field(&mut self.ctx)?,
        }
        match &mut self.reference {
            Some(buf) => fields::parse_string_field(&mut self.ctx, "REF", buf)?,
            None => fields::skip_field(&mut self.ctx)?,
        }
        match &mut self.alt {
            Some(buf) => {
                let (_, number) = self.cfg.alt.expect("alt buffer implies alt config");
                fields::parse_alt(&mut self.ctx, buf, number)?;
            }
            None => fields::skip_field(&mut self.ctx)?,
        }
        match &mut self.qual {
            Some(buf) => fields::parse_qual(&mut self.ctx, buf)?,
            None => fields::skip_field(&mut self.ctx)?,
        }

        FilterParser::new(&self.cfg.filters).parse(&mut self.ctx, &mut self.filters)?;
        InfoParser::new(&self.cfg.info, &self.cfg.info_index).parse(&mut self.ctx, &mut self.info)?;

        if self.cfg.n_samples > 0 {
            FormatParser::new(&self.cfg.calldata_index, self.cfg.gt.is_some()).parse(&mut self.ctx)?;
            CalldataParser::new(&self.cfg.calldata).parse(&mut self.ctx, self.gt.as_mut(), &mut self.calldata)?;
        } else if self.ctx.c == NEWLINE {
            self.ctx.getc()?;
        }

        Ok(())
    }

    fn finalize_chunk(&mut self, true_len: usize) -> Chunk {
        let mut chunk = Chunk::new(true_len);
        if let Some(buf) = &mut self.chrom {
            chunk.insert("variants/CHROM", Column::Bytes(buf.freeze(true_len, false)));
        }
        if let Some(buf) = &mut self.pos {
            chunk.insert("variants/POS", Column::I32(buf.freeze(true_len, false)));
        }
        if let Some(buf) = &mut self.id {
            chunk.insert("variants/ID", Column::Bytes(buf.freeze(true_len, false)));
        }
        if let Some(buf) = &mut self.reference {
            chunk.insert("variants/REF", Column::Bytes(buf.freeze(true_len, false)));
        }
        if let Some(buf) = &mut self.alt {
            let (_, number) = self.cfg.alt.expect("alt buffer implies alt config");
            chunk.insert("variants/ALT", Column::Bytes(buf.freeze(true_len, number == 1)));
        }
        if let Some(buf) = &mut self.qual {
            chunk.insert("variants/QUAL", Column::F32(buf.freeze(true_len, false)));
        }
        for (name, buf) in self.cfg.filters.iter().zip(self.filters.iter_mut()) {
            chunk.insert(format!("variants/FILTER_{name}"), Column::Bool(buf.freeze(true_len, false)));
        }
        for (spec, col) in self.cfg.info.iter().zip(self.info.iter_mut()) {
            chunk.insert(format!("variants/{}", spec.name), col.freeze(true_len, spec.number == 1));
        }
        if let Some(col) = &mut self.gt {
            chunk.insert("calldata/GT", col.freeze(true_len, false));
        }
        for (spec, col) in self.cfg.calldata.iter().zip(self.calldata.iter_mut()) {
            chunk.insert(format!("calldata/{}", spec.name), col.freeze(true_len, spec.number == 1));
        }
        chunk
    }
}
