// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Abstract values a filesystem server hands to the codecs

use crate::mode::{FileMode, FileType};
use fusewire_proto::{
    DT_BLK, DT_CHR, DT_DIR, DT_FIFO, DT_LNK, DT_REG, DT_SOCK, DT_UNKNOWN, FUSE_ROOT_ID,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Kernel-visible identifier of a filesystem object, unique within a mount
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InodeId(pub u64);

impl InodeId {
    /// The mount root
    pub const ROOT: InodeId = InodeId(FUSE_ROOT_ID);
}

impl From<u64> for InodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for InodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque continuation offset within a directory listing. Only the server
/// that produced it can interpret it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DirOffset(pub u64);

/// Attributes of one inode
///
/// The block count is not stored; it is derived from `size` when encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InodeAttributes {
    pub size: u64,
    pub nlink: u32,
    pub mode: FileMode,
    /// Device number; only transmitted for character and block devices
    pub rdev: u32,
    pub uid: u32,
    pub gid: u32,
    pub atime: SystemTime,
    pub mtime: SystemTime,
    pub ctime: SystemTime,
    /// Creation time; only the Darwin record has room for it
    pub crtime: SystemTime,
}

impl Default for InodeAttributes {
    fn default() -> Self {
        Self {
            size: 0,
            nlink: 0,
            mode: FileMode::empty(),
            rdev: 0,
            uid: 0,
            gid: 0,
            atime: UNIX_EPOCH,
            mtime: UNIX_EPOCH,
            ctime: UNIX_EPOCH,
            crtime: UNIX_EPOCH,
        }
    }
}

/// Result of a successful name lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChildInodeEntry {
    pub child: InodeId,
    /// Distinguishes successive objects that reuse the same inode number
    pub generation: u64,
    pub attributes: InodeAttributes,
    /// When the kernel must refetch `attributes`
    pub attributes_expiration: SystemTime,
    /// When the kernel must repeat the lookup for this name
    pub entry_expiration: SystemTime,
}

impl ChildInodeEntry {
    /// An entry whose caches expire immediately
    pub fn uncached(child: InodeId, attributes: InodeAttributes) -> Self {
        Self {
            child,
            generation: 0,
            attributes,
            attributes_expiration: UNIX_EPOCH,
            entry_expiration: UNIX_EPOCH,
        }
    }
}

/// `d_type` tag of a directory entry. The discriminants are fixed by the
/// protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum DirentType {
    /// Legal; the kernel will issue GETATTR when it needs the type
    #[default]
    Unknown = DT_UNKNOWN,
    NamedPipe = DT_FIFO,
    CharDevice = DT_CHR,
    Directory = DT_DIR,
    BlockDevice = DT_BLK,
    Regular = DT_REG,
    Symlink = DT_LNK,
    Socket = DT_SOCK,
}

impl DirentType {
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            DT_UNKNOWN => Some(DirentType::Unknown),
            DT_FIFO => Some(DirentType::NamedPipe),
            DT_CHR => Some(DirentType::CharDevice),
            DT_DIR => Some(DirentType::Directory),
            DT_BLK => Some(DirentType::BlockDevice),
            DT_REG => Some(DirentType::Regular),
            DT_LNK => Some(DirentType::Symlink),
            DT_SOCK => Some(DirentType::Socket),
            _ => None,
        }
    }
}

impl From<FileType> for DirentType {
    fn from(kind: FileType) -> Self {
        match kind {
            FileType::Regular => DirentType::Regular,
            FileType::Directory => DirentType::Directory,
            FileType::CharDevice => DirentType::CharDevice,
            FileType::BlockDevice => DirentType::BlockDevice,
            FileType::NamedPipe => DirentType::NamedPipe,
            FileType::Symlink => DirentType::Symlink,
            FileType::Socket => DirentType::Socket,
        }
    }
}

/// One entry of a directory listing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dirent {
    /// Offset of the entry that follows this one
    pub offset: DirOffset,
    pub inode: InodeId,
    /// Raw name bytes; no terminator, no encoding assumed
    pub name: Vec<u8>,
    pub kind: DirentType,
}

impl Dirent {
    pub fn new(offset: u64, inode: InodeId, name: impl Into<Vec<u8>>, kind: DirentType) -> Self {
        Self {
            offset: DirOffset(offset),
            inode,
            name: name.into(),
            kind,
        }
    }
}
