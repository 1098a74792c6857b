// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Inode attributes <-> `fuse_attr`

use crate::error::CodecResult;
use crate::mode::{self, FileType};
use crate::time::{expiration_to_relative, from_kernel_time, to_kernel_time};
use crate::types::{InodeAttributes, InodeId};
use fusewire_proto::{AttrOutRecord, AttrRecord, BLOCK_UNIT};
use std::time::SystemTime;

/// Build the kernel attribute record for `ino`
pub fn encode_attributes(ino: InodeId, attrs: &InodeAttributes) -> AttrRecord {
    let mode = mode::encode(attrs.mode);

    // rdev of anything but a device node is meaningless; never leak it
    let is_device = FileType::from_kernel_bits(mode).is_some_and(FileType::is_device);
    let rdev = if is_device { attrs.rdev } else { 0 };

    AttrRecord {
        ino: ino.0,
        size: attrs.size,
        blocks: attrs.size.div_ceil(BLOCK_UNIT),
        atime: to_kernel_time(attrs.atime),
        mtime: to_kernel_time(attrs.mtime),
        ctime: to_kernel_time(attrs.ctime),
        crtime: to_kernel_time(attrs.crtime),
        mode,
        nlink: attrs.nlink,
        uid: attrs.uid,
        gid: attrs.gid,
        rdev,
        blksize: 0,
        flags: 0,
    }
}

/// GETATTR reply: attributes plus how long the kernel may cache them
pub fn encode_attr_out(
    ino: InodeId,
    attrs: &InodeAttributes,
    expiration: SystemTime,
    now: SystemTime,
) -> AttrOutRecord {
    AttrOutRecord {
        attr_valid: expiration_to_relative(expiration, now),
        attr: encode_attributes(ino, attrs),
    }
}

/// Recover the abstract attributes from a kernel record. The block count is
/// dropped since it is always derived from the size.
pub fn decode_attributes(record: &AttrRecord) -> CodecResult<(InodeId, InodeAttributes)> {
    let attrs = InodeAttributes {
        size: record.size,
        nlink: record.nlink,
        mode: mode::decode(record.mode),
        rdev: record.rdev,
        uid: record.uid,
        gid: record.gid,
        atime: from_kernel_time(record.atime)?,
        mtime: from_kernel_time(record.mtime)?,
        ctime: from_kernel_time(record.ctime)?,
        crtime: from_kernel_time(record.crtime)?,
    };
    Ok((InodeId(record.ino), attrs))
}
