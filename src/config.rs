// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! The configuration layer the driver is constructed from.
//!
//! Header parsing (sample names, declared types, declared cardinalities) is
//! assumed to be done by an external collaborator; this module only defines
//! the typed shape that collaborator's output takes, and validates it.

use std::collections::HashMap;

use thiserror::Error;

use crate::array::{ByteArray, Column, Shape};

/// The storage types a declared field may use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageType {
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    /// Used for INFO flags: present or absent, no value.
    Boolean,
    /// A fixed-width byte string of `itemsize` bytes per slot.
    FixedString { itemsize: usize },
}

impl StorageType {
    /// Allocates a fresh, fully fill-initialized column of this type and
    /// shape.
    pub fn alloc(&self, shape: Shape) -> Column {
        match *self {
            StorageType::Int8 => Column::I8(crate::numeric::new_i8_array(shape)),
            StorageType::Int16 => Column::I16(crate::numeric::new_i16_array(shape)),
            StorageType::Int32 => Column::I32(crate::numeric::new_i32_array(shape)),
            StorageType::Int64 => Column::I64(crate::numeric::new_i64_array(shape)),
            StorageType::Float32 => Column::F32(crate::numeric::new_f32_array(shape)),
            StorageType::Float64 => Column::F64(crate::numeric::new_f64_array(shape)),
            StorageType::Boolean => Column::Bool(crate::numeric::new_bool_array(shape)),
            StorageType::FixedString { itemsize } => Column::Bytes(ByteArray::new(shape, itemsize)),
        }
    }
}

/// The shape of a per-record field (INFO, or any fixed column declared with
/// a cardinality): the trailing `number` dimension is only materialized
/// when `number > 1`.
pub fn field_shape(chunk_length: usize, number: u16) -> Shape {
    if number == 1 {
        Shape::new([chunk_length])
    } else {
        Shape::new([chunk_length, number as usize])
    }
}

/// The shape of a per-sample calldata field: `(chunk_length, n_samples)` or
/// `(chunk_length, n_samples, number)` for `number > 1`.
pub fn calldata_shape(chunk_length: usize, n_samples: usize, number: u16) -> Shape {
    if number == 1 {
        Shape::new([chunk_length, n_samples])
    } else {
        Shape::new([chunk_length, n_samples, number as usize])
    }
}

/// The shape of `calldata/GT`: always `(chunk_length, n_samples, ploidy)`,
/// never squeezed even at `ploidy == 1` — squeezing applies to INFO/calldata
/// cardinality fields, not to GT's ploidy dimension.
pub fn gt_shape(chunk_length: usize, n_samples: usize, ploidy: usize) -> Shape {
    Shape::new([chunk_length, n_samples, ploidy])
}

/// One declared field: its canonical name fragment (the key, not the
/// `variants/`/`calldata/` prefix), storage type, and cardinality.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: StorageType,
    /// Declared number of values per record (INFO) or per sample
    /// (calldata). `1` means the trailing dimension is squeezed on emit.
    pub number: u16,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: StorageType, number: u16) -> Self {
        FieldSpec {
            name: name.into(),
            ty,
            number,
        }
    }
}

/// An error raised while building a [`Config`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("chunk_length must be at least 1")]
    ZeroChunkLength,
    #[error("ploidy must be at least 1")]
    ZeroPloidy,
    #[error("input_buffer_size must be non-zero")]
    ZeroInputBuffer,
    #[error("temp_buffer_size must be non-zero")]
    ZeroTempBuffer,
    #[error("field {0:?} is declared more than once in the same section")]
    DuplicateField(String),
    #[error("fixed-width string field {0:?} has itemsize 0")]
    ZeroItemsize(String),
}

/// The fully validated, static configuration a [`Driver`](crate::driver::Driver)
/// is constructed from.
#[derive(Clone, Debug)]
pub struct Config {
    pub chunk_length: usize,
    pub input_buffer_size: usize,
    pub temp_buffer_size: usize,
    pub ploidy: usize,
    pub n_samples: usize,

    pub chrom: Option<usize>,
    pub pos: bool,
    pub id: Option<usize>,
    pub reference: Option<usize>,
    pub alt: Option<(usize, u16)>,
    pub qual: bool,

    /// Ordered filter names. `variants/FILTER_PASS` is only materialized if
    /// the caller names `"PASS"` explicitly here.
    pub filters: Vec<String>,

    pub info: Vec<FieldSpec>,
    pub gt: Option<StorageType>,
    pub calldata: Vec<FieldSpec>,

    /// Precomputed `key -> index` registries, built once so FORMAT
    /// resolution during parsing never performs a string comparison against
    /// each declared key in turn.
    pub(crate) info_index: HashMap<String, usize>,
    pub(crate) calldata_index: HashMap<String, usize>,
}

/// Incremental, validating builder for [`Config`].
#[derive(Clone, Debug, Default)]
pub struct ConfigBuilder {
    chunk_length: usize,
    input_buffer_size: usize,
    temp_buffer_size: usize,
    ploidy: usize,
    n_samples: usize,

    chrom: Option<usize>,
    pos: bool,
    id: Option<usize>,
    reference: Option<usize>,
    alt: Option<(usize, u16)>,
    qual: bool,
    filters: Vec<String>,
    info: Vec<FieldSpec>,
    gt: Option<StorageType>,
    calldata: Vec<FieldSpec>,
}

impl ConfigBuilder {
    pub fn new(n_samples: usize, ploidy: usize) -> Self {
        ConfigBuilder {
            chunk_length: 1 << 16,
            input_buffer_size: 1 << 16,
            temp_buffer_size: 1 << 12,
            ploidy,
            n_samples,
            ..Default::default()
        }
    }

    pub fn chunk_length(mut self, n: usize) -> Self {
        self.chunk_length = n;
        self
    }

    pub fn input_buffer_size(mut self, n: usize) -> Self {
        self.input_buffer_size = n;
        self
    }

    pub fn temp_buffer_size(mut self, n: usize) -> Self {
        self.temp_buffer_size = n;
        self
    }

    pub fn chrom(mut self, itemsize: usize) -> Self {
        self.chrom = Some(itemsize);
        self
    }

    pub fn pos(mut self) -> Self {
        self.pos = true;
        self
    }

    pub fn id(mut self, itemsize: usize) -> Self {
        self.id = Some(itemsize);
        self
    }

    pub fn reference(mut self, itemsize: usize) -> Self {
        self.reference = Some(itemsize);
        self
    }

    pub fn alt(mut self, itemsize: usize, number: u16) -> Self {
        self.alt = Some((itemsize, number));
        self
    }

    pub fn qual(mut self) -> Self {
        self.qual = true;
        self
    }

    pub fn filter(mut self, name: impl Into<String>) -> Self {
        self.filters.push(name.into());
        self
    }

    pub fn info(mut self, name: impl Into<String>, ty: StorageType, number: u16) -> Self {
        self.info.push(FieldSpec::new(name, ty, number));
        self
    }

    pub fn gt(mut self, ty: StorageType) -> Self {
        self.gt = Some(ty);
        self
    }

    pub fn calldata(mut self, name: impl Into<String>, ty: StorageType, number: u16) -> Self {
        self.calldata.push(FieldSpec::new(name, ty, number));
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        if self.chunk_length == 0 {
            return Err(ConfigError::ZeroChunkLength);
        }
        if self.ploidy == 0 {
            return Err(ConfigError::ZeroPloidy);
        }
        if self.input_buffer_size == 0 {
            return Err(ConfigError::ZeroInputBuffer);
        }
        if self.temp_buffer_size == 0 {
            return Err(ConfigError::ZeroTempBuffer);
        }
        for spec in self.info.iter().chain(self.calldata.iter()) {
            if let StorageType::FixedString { itemsize: 0 } = spec.ty {
                return Err(ConfigError::ZeroItemsize(spec.name.clone()));
            }
        }

        let info_index = build_index(&self.info)?;
        let calldata_index = build_index(&self.calldata)?;

        Ok(Config {
            chunk_length: self.chunk_length,
            input_buffer_size: self.input_buffer_size,
            temp_buffer_size: self.temp_buffer_size,
            ploidy: self.ploidy,
            n_samples: self.n_samples,
            chrom: self.chrom,
            pos: self.pos,
            id: self.id,
            reference: self.reference,
            alt: self.alt,
            qual: self.qual,
            filters: self.filters,
            info: self.info,
            gt: self.gt,
            calldata: self.calldata,
            info_index,
            calldata_index,
        })
    }
}

fn build_index(specs: &[FieldSpec]) -> Result<HashMap<String, usize>, ConfigError> {
    let mut index = HashMap::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        if index.insert(spec.name.clone(), i).is_some() {
            return Err(ConfigError::DuplicateField(spec.name.clone()));
        }
    }
    Ok(index)
}
