// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! Fixed-shape output buffers.
//!
//! Shapes are fixed at compile time to at most three dimensions (`(len,)`,
//! `(len, number)`, or `(len, n_samples, number)`/`(len, n_samples,
//! ploidy)`), so a hand-rolled flat-`Vec` type, row-major like the arrays it
//! stands in for, covers every shape this crate ever produces without
//! pulling in a numerics crate like `ndarray`.

use std::collections::HashMap;

use static_assertions::assert_impl_all;

/// The dimensions of an output buffer, outermost first. The first dimension
/// is always the number of records in the chunk (`chunk_length`, or the
/// true length of a partial tail chunk).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape(Vec<usize>);

assert_impl_all!(Shape: Send, Sync);

impl Shape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Self {
        let dims = dims.into();
        assert!(!dims.is_empty(), "shape must have at least one dimension");
        Shape(dims)
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// The total number of elements (product of all dimensions).
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of this shape with the first dimension replaced.
    fn with_rows(&self, rows: usize) -> Shape {
        let mut dims = self.0.clone();
        dims[0] = rows;
        Shape(dims)
    }

    /// Drops the trailing dimension, for fields declared with `number == 1`.
    fn squeeze_last(&self) -> Shape {
        let mut dims = self.0.clone();
        if dims.len() > 1 {
            debug_assert_eq!(*dims.last().unwrap(), 1, "squeezing a non-unit dimension");
            dims.pop();
        }
        Shape(dims)
    }

    /// The number of elements in one row (product of all dims but the
    /// first).
    fn row_elems(&self) -> usize {
        self.0[1..].iter().product::<usize>().max(1)
    }

    /// Flattens a multi-index into an offset, row-major.
    fn flat_index(&self, idx: &[usize]) -> usize {
        debug_assert_eq!(self.0.len(), idx.len(), "index rank mismatch");
        let mut offset = 0usize;
        for (&dim, &i) in self.0.iter().zip(idx) {
            debug_assert!(i < dim, "index {i} out of bounds for dimension {dim}");
            offset = offset * dim + i;
        }
        offset
    }
}

/// A fixed-shape, fixed-fill numeric output buffer.
///
/// Every slot starts at `fill` and is only ever overwritten once per
/// record, matching the invariant that "exactly one write occurs into each
/// requested field's row, or the row keeps its fill value."
#[derive(Clone, Debug)]
pub struct Array<T> {
    shape: Shape,
    data: Vec<T>,
    fill: T,
}

impl<T: Copy> Array<T> {
    pub fn new(shape: Shape, fill: T) -> Self {
        let len = shape.len();
        Array {
            data: vec![fill; len],
            shape,
            fill,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn set(&mut self, idx: &[usize], value: T) {
        let off = self.shape.flat_index(idx);
        self.data[off] = value;
    }

    pub fn get(&self, idx: &[usize]) -> T {
        let off = self.shape.flat_index(idx);
        self.data[off]
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Slices the buffer to `true_len` records, optionally squeezing a
    /// trailing unit dimension, and replaces `self` with a fresh buffer of
    /// the original full shape filled with the fill value. The returned
    /// array is ready to hand to the caller as part of an emitted chunk.
    pub fn freeze(&mut self, true_len: usize, squeeze_last: bool) -> Array<T> {
        let row_elems = self.shape.row_elems();
        let take = true_len * row_elems;
        let frozen_data = self.data[..take].to_vec();
        let mut frozen_shape = self.shape.with_rows(true_len);
        if squeeze_last {
            frozen_shape = frozen_shape.squeeze_last();
        }
        let fresh = Array::new(self.shape.clone(), self.fill);
        let frozen = Array {
            shape: frozen_shape,
            data: frozen_data,
            fill: self.fill,
        };
        *self = fresh;
        frozen
    }
}

/// A fixed-shape, fixed-width byte-string output buffer (CHROM/ID/REF/ALT
/// and string-typed INFO/calldata fields). `shape` excludes the itemsize
/// dimension; each logical slot occupies exactly `itemsize` bytes of `data`.
#[derive(Clone, Debug)]
pub struct ByteArray {
    shape: Shape,
    itemsize: usize,
    data: Vec<u8>,
}

impl ByteArray {
    pub fn new(shape: Shape, itemsize: usize) -> Self {
        let len = shape.len() * itemsize;
        ByteArray {
            data: vec![0u8; len],
            shape,
            itemsize,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn itemsize(&self) -> usize {
        self.itemsize
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn slot_mut(&mut self, idx: &[usize]) -> &mut [u8] {
        let off = self.shape.flat_index(idx) * self.itemsize;
        &mut self.data[off..off + self.itemsize]
    }

    pub fn slot(&self, idx: &[usize]) -> &[u8] {
        let off = self.shape.flat_index(idx) * self.itemsize;
        &self.data[off..off + self.itemsize]
    }

    /// Copies `bytes` into the slot at `idx`, truncating silently if it is
    /// longer than `itemsize` and zero-padding the remainder if shorter.
    /// Returns whether truncation occurred.
    pub fn write(&mut self, idx: &[usize], bytes: &[u8]) -> bool {
        let slot = self.slot_mut(idx);
        let n = bytes.len().min(slot.len());
        slot[..n].copy_from_slice(&bytes[..n]);
        for b in &mut slot[n..] {
            *b = 0;
        }
        bytes.len() > slot.len()
    }

    pub fn freeze(&mut self, true_len: usize, squeeze_last: bool) -> ByteArray {
        let row_elems = self.shape.row_elems();
        let take = true_len * row_elems * self.itemsize;
        let frozen_data = self.data[..take].to_vec();
        let mut frozen_shape = self.shape.with_rows(true_len);
        if squeeze_last {
            frozen_shape = frozen_shape.squeeze_last();
        }
        let fresh = ByteArray::new(self.shape.clone(), self.itemsize);
        let frozen = ByteArray {
            shape: frozen_shape,
            itemsize: self.itemsize,
            data: frozen_data,
        };
        *self = fresh;
        frozen
    }
}

/// A typed output column, as materialized into an emitted [`Chunk`].
#[derive(Clone, Debug)]
pub enum Column {
    Bytes(ByteArray),
    I8(Array<i8>),
    I16(Array<i16>),
    I32(Array<i32>),
    I64(Array<i64>),
    F32(Array<f32>),
    F64(Array<f64>),
    Bool(Array<bool>),
}

impl Column {
    pub fn shape(&self) -> &Shape {
        match self {
            Column::Bytes(a) => a.shape(),
            Column::I8(a) => a.shape(),
            Column::I16(a) => a.shape(),
            Column::I32(a) => a.shape(),
            Column::I64(a) => a.shape(),
            Column::F32(a) => a.shape(),
            Column::F64(a) => a.shape(),
            Column::Bool(a) => a.shape(),
        }
    }

    /// Freezes whichever array this column wraps, see [`Array::freeze`] /
    /// [`ByteArray::freeze`].
    pub fn freeze(&mut self, true_len: usize, squeeze_last: bool) -> Column {
        match self {
            Column::Bytes(a) => Column::Bytes(a.freeze(true_len, squeeze_last)),
            Column::I8(a) => Column::I8(a.freeze(true_len, squeeze_last)),
            Column::I16(a) => Column::I16(a.freeze(true_len, squeeze_last)),
            Column::I32(a) => Column::I32(a.freeze(true_len, squeeze_last)),
            Column::I64(a) => Column::I64(a.freeze(true_len, squeeze_last)),
            Column::F32(a) => Column::F32(a.freeze(true_len, squeeze_last)),
            Column::F64(a) => Column::F64(a.freeze(true_len, squeeze_last)),
            Column::Bool(a) => Column::Bool(a.freeze(true_len, squeeze_last)),
        }
    }
}

/// A batch of up to `chunk_length` parsed records, materialized as a
/// mapping from canonical field name (`variants/POS`, `variants/FILTER_PASS`,
/// `calldata/GT`, ...) to a fixed-shape array. `len` is the true number of
/// records represented (`chunk_length` for all but the final chunk).
#[derive(Clone, Debug, Default)]
pub struct Chunk {
    pub len: usize,
    pub fields: HashMap<String, Column>,
}

impl Chunk {
    pub fn new(len: usize) -> Self {
        Chunk {
            len,
            fields: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, column: Column) {
        self.fields.insert(name.into(), column);
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.fields.get(name)
    }
}
