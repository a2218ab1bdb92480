// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

//! Streaming parser that converts tab-delimited variant call records into
//! fixed-shape chunked arrays.
//!
//! The entry point is [`Driver`]: construct one from a [`Config`] (built via
//! [`ConfigBuilder`]) and a byte reader, then pull [`Chunk`]s from it with
//! [`Driver::next_chunk`] until it returns `None`.
//!
//! ```no_run
//! use vcf_chunk_parse::{Config, ConfigBuilder, Driver, StorageType};
//!
//! # fn run(reader: impl std::io::Read) -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = ConfigBuilder::new(2, 2)
//!     .pos()
//!     .filter("PASS")
//!     .gt(StorageType::Int8)
//!     .build()?;
//! let mut driver = Driver::new(reader, cfg)?;
//! while let Some(chunk) = driver.next_chunk()? {
//!     println!("chunk of {} records", chunk.len);
//! }
//! # Ok(())
//! # }
//! ```

mod array;
mod calldata;
mod config;
mod context;
mod driver;
mod error;
mod fields;
mod filter;
mod format;
mod info;
mod numeric;
mod quote;
mod source;

pub use array::{Array, ByteArray, Chunk, Column, Shape};
pub use config::{Config, ConfigBuilder, ConfigError, FieldSpec, StorageType};
pub use driver::Driver;
pub use error::{ParseError, Warning};
