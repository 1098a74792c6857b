// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Numeric constants fixed by the kernel protocol
//!
//! Values match `fuse_kernel.h` and the POSIX `st_mode` / `d_type` encodings
//! the kernel expects. They are defined here rather than taken from `libc`
//! because `libc` types them differently per target (`mode_t` is `u16` on
//! macOS) while the wire always carries `u32`.

/// Node id the kernel uses for the mount root
pub const FUSE_ROOT_ID: u64 = 1;

// File type bits of `st_mode`

pub const S_IFMT: u32 = 0o170000;
pub const S_IFSOCK: u32 = 0o140000;
pub const S_IFLNK: u32 = 0o120000;
pub const S_IFREG: u32 = 0o100000;
pub const S_IFBLK: u32 = 0o060000;
pub const S_IFDIR: u32 = 0o040000;
pub const S_IFCHR: u32 = 0o020000;
pub const S_IFIFO: u32 = 0o010000;

// Special permission bits

pub const S_ISUID: u32 = 0o4000;
pub const S_ISGID: u32 = 0o2000;
pub const S_ISVTX: u32 = 0o1000;

/// rwx bits for user, group and other
pub const PERMISSION_MASK: u32 = 0o777;

// Directory entry type tags (`d_type`)

pub const DT_UNKNOWN: u32 = 0;
pub const DT_FIFO: u32 = 1;
pub const DT_CHR: u32 = 2;
pub const DT_DIR: u32 = 4;
pub const DT_BLK: u32 = 6;
pub const DT_REG: u32 = 8;
pub const DT_LNK: u32 = 10;
pub const DT_SOCK: u32 = 12;

/// Directory records start on this boundary (`FUSE_DIRENT_ALIGN`)
pub const DIRENT_ALIGN: usize = 8;

/// Size of `fuse_dirent` without its trailing name
pub const DIRENT_HEADER_SIZE: usize = 24;

/// Size of one `st_blocks` unit
pub const BLOCK_UNIT: u64 = 512;
