// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! fusewire core: inode metadata to FUSE kernel records
//!
//! Turns the abstract values a filesystem server produces (attributes, lookup
//! results, directory entries, absolute cache expirations) into the records
//! defined in `fusewire-proto`, and back. Every codec is a pure function over
//! borrowed inputs and a caller-owned output buffer; "now" is always passed
//! in, except through [`ReplyEncoder`] which samples a [`Clock`] once per call.

pub mod attr;
pub mod clock;
pub mod dirent;
pub mod encoder;
pub mod entry;
pub mod error;
pub mod mode;
pub mod time;
pub mod types;

pub use attr::{decode_attributes, encode_attr_out, encode_attributes};
pub use clock::{Clock, SystemClock};
pub use dirent::{DecodedDirent, DirentIter, DirentPage, DirentWriter};
pub use encoder::ReplyEncoder;
pub use entry::encode_child_entry;
pub use error::{CodecError, CodecResult};
pub use mode::{FileMode, FileType};
pub use types::{ChildInodeEntry, DirOffset, Dirent, DirentType, InodeAttributes, InodeId};

// Re-export the wire layer so servers only need one dependency
pub use fusewire_proto as proto;
pub use fusewire_proto::{AbiFlavor, KernelTime};
