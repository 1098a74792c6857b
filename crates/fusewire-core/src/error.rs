// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for the decode direction
//!
//! Encoding never fails: a dirent that does not fit is reported by writing
//! zero bytes. These errors only arise when parsing records back out of a
//! buffer.

use fusewire_proto::RecordError;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("record error: {0}")]
    Record(#[from] RecordError),
    #[error("dirent at byte {at} declares a {namelen}-byte name but only {available} bytes remain")]
    TruncatedName {
        at: usize,
        namelen: usize,
        available: usize,
    },
    #[error("timestamp {secs}s is not representable on this host")]
    TimeOutOfRange { secs: u64 },
}

pub type CodecResult<T> = Result<T, CodecError>;
