// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for record serialization and parsing

use thiserror::Error;

/// Failure to place a record into, or read it out of, a byte slice
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("unknown ABI flavor: {0}")]
    UnknownFlavor(String),
}

pub type RecordResult<T> = Result<T, RecordError>;
