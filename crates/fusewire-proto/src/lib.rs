// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fusewire protocol: FUSE kernel ABI constants and wire records
//!
//! This crate owns the byte layout of the records a userspace FUSE driver
//! sends to the kernel in attribute, lookup and directory-read replies.
//! Every record is serialized field by field at its documented offset in
//! host byte order; nothing here relies on Rust struct layout.

pub mod consts;
pub mod error;
pub mod layout;
pub mod records;

pub use consts::*;
pub use error::{RecordError, RecordResult};
pub use layout::{AbiFlavor, dirent_len, dirent_padding};
pub use records::{AttrOutRecord, AttrRecord, DirentHeader, EntryRecord, KernelTime};
