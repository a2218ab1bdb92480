// Copyright (C) Thalia Archibald. All rights reserved.
//
// This file is part of vcf-chunk-parse, distributed under the GPL 2.0 with a
// linking exception. For the full terms, see the included COPYING file.

use std::{fmt, io};

use thiserror::Error;

/// Result type used throughout the parser.
pub type PResult<T> = Result<T, ParseError>;

/// A fatal parsing error. Returning one of these ends the stream: either an
/// I/O failure, or an internal contract violation that the permissive,
/// warn-and-continue recovery model cannot paper over.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failure reading from the underlying byte source.
    #[error("I/O error at variant {variant_index}: {source}")]
    Io {
        variant_index: u64,
        #[source]
        source: io::Error,
    },
    /// The record state machine reached a state with no registered parser.
    /// This can only happen from a bug in the driver itself.
    #[error("internal error: unreachable parser state {state:?} at variant {variant_index}")]
    UnreachableState { variant_index: u64, state: String },
}

/// A recoverable parsing anomaly: parsing continues, the offending slot
/// keeps its fill value (or is truncated/dropped, depending on the case),
/// and this warning is appended to the chunk's warning sink and mirrored to
/// the `log` facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The record at which the anomaly occurred.
    pub variant_index: u64,
    /// The field or subfield the anomaly concerns, e.g. `"QUAL"` or
    /// `"calldata/DP"`.
    pub field: &'static str,
    /// Human-readable description of the anomaly.
    pub message: String,
}

impl Warning {
    pub(crate) fn new(variant_index: u64, field: &'static str, message: impl Into<String>) -> Self {
        let warning = Warning {
            variant_index,
            field,
            message: message.into(),
        };
        log::warn!(
            "variant {}: {} ({})",
            warning.variant_index,
            warning.message,
            warning.field
        );
        warning
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "variant {}: {} ({})", self.variant_index, self.message, self.field)
    }
}
