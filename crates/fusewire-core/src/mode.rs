// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! File type and permission bits: host flags <-> kernel `st_mode`
//!
//! Servers describe a node with [`FileMode`]: nine permission bits, the three
//! special bits and at most one file-type flag. The kernel wants the packed
//! POSIX `st_mode` encoding. [`encode`] picks the file type by walking
//! [`TYPE_PRECEDENCE`] in order; [`decode`] is its inverse for every defined
//! type.

use bitflags::bitflags;
use fusewire_proto::{
    PERMISSION_MASK, S_IFBLK, S_IFCHR, S_IFDIR, S_IFIFO, S_IFLNK, S_IFMT, S_IFREG, S_IFSOCK,
    S_ISGID, S_ISUID, S_ISVTX,
};
use std::fmt;
use tracing::debug;

bitflags! {
    /// Host-side mode: permission bits in the low nine bits, type and special
    /// flags in the high bits. A regular file has no type flag set.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FileMode: u32 {
        const PERMISSIONS = 0o777;

        const STICKY = 1 << 20;
        const SETGID = 1 << 21;
        const SETUID = 1 << 22;

        const SOCKET = 1 << 24;
        const NAMED_PIPE = 1 << 25;
        /// Refines DEVICE into a character device
        const CHAR_DEVICE = 1 << 26;
        const DEVICE = 1 << 27;
        const SYMLINK = 1 << 28;
        const DIR = 1 << 31;
    }
}

/// The seven node types the protocol can describe
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileType {
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    NamedPipe,
    Symlink,
    Socket,
}

impl FileType {
    pub const ALL: [FileType; 7] = [
        FileType::Regular,
        FileType::Directory,
        FileType::CharDevice,
        FileType::BlockDevice,
        FileType::NamedPipe,
        FileType::Symlink,
        FileType::Socket,
    ];

    /// Host flags that select this type
    pub const fn flags(self) -> FileMode {
        match self {
            FileType::Regular => FileMode::empty(),
            FileType::Directory => FileMode::DIR,
            FileType::CharDevice => FileMode::DEVICE.union(FileMode::CHAR_DEVICE),
            FileType::BlockDevice => FileMode::DEVICE,
            FileType::NamedPipe => FileMode::NAMED_PIPE,
            FileType::Symlink => FileMode::SYMLINK,
            FileType::Socket => FileMode::SOCKET,
        }
    }

    /// `S_IF*` value of this type
    pub const fn kernel_bits(self) -> u32 {
        match self {
            FileType::Regular => S_IFREG,
            FileType::Directory => S_IFDIR,
            FileType::CharDevice => S_IFCHR,
            FileType::BlockDevice => S_IFBLK,
            FileType::NamedPipe => S_IFIFO,
            FileType::Symlink => S_IFLNK,
            FileType::Socket => S_IFSOCK,
        }
    }

    /// Classify the `S_IFMT` portion of a kernel mode
    pub const fn from_kernel_bits(mode: u32) -> Option<Self> {
        match mode & S_IFMT {
            S_IFREG => Some(FileType::Regular),
            S_IFDIR => Some(FileType::Directory),
            S_IFCHR => Some(FileType::CharDevice),
            S_IFBLK => Some(FileType::BlockDevice),
            S_IFIFO => Some(FileType::NamedPipe),
            S_IFLNK => Some(FileType::Symlink),
            S_IFSOCK => Some(FileType::Socket),
            _ => None,
        }
    }

    /// Whether the attribute record's device number is meaningful
    pub const fn is_device(self) -> bool {
        matches!(self, FileType::CharDevice | FileType::BlockDevice)
    }
}

/// One step of the type classification used by [`encode`]
#[derive(Clone, Copy)]
pub struct TypeRule {
    pub matches: fn(FileMode) -> bool,
    pub kind: FileType,
}

impl fmt::Debug for TypeRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRule").field("kind", &self.kind).finish_non_exhaustive()
    }
}

/// Evaluated top to bottom; the first matching rule decides the type and a
/// mode matching none of them is a regular file. Only one type flag is legal
/// on a host mode, so the order matters only for malformed input.
pub const TYPE_PRECEDENCE: [TypeRule; 6] = [
    TypeRule {
        matches: has_dir,
        kind: FileType::Directory,
    },
    TypeRule {
        matches: has_char_device,
        kind: FileType::CharDevice,
    },
    TypeRule {
        matches: has_device,
        kind: FileType::BlockDevice,
    },
    TypeRule {
        matches: has_named_pipe,
        kind: FileType::NamedPipe,
    },
    TypeRule {
        matches: has_symlink,
        kind: FileType::Symlink,
    },
    TypeRule {
        matches: has_socket,
        kind: FileType::Socket,
    },
];

fn has_dir(m: FileMode) -> bool {
    m.contains(FileMode::DIR)
}

fn has_char_device(m: FileMode) -> bool {
    m.contains(FileMode::DEVICE | FileMode::CHAR_DEVICE)
}

fn has_device(m: FileMode) -> bool {
    m.contains(FileMode::DEVICE)
}

fn has_named_pipe(m: FileMode) -> bool {
    m.contains(FileMode::NAMED_PIPE)
}

fn has_symlink(m: FileMode) -> bool {
    m.contains(FileMode::SYMLINK)
}

fn has_socket(m: FileMode) -> bool {
    m.contains(FileMode::SOCKET)
}

/// Host mode assigned to kernel modes whose type bits match no defined type.
///
/// Suspect: this looks like a placeholder rather than a deliberate rule (a
/// zero `S_IFMT` also lands here). It is kept so behavior stays predictable,
/// and every use is logged.
pub const UNKNOWN_TYPE_FALLBACK: FileMode = FileMode::DEVICE;

impl FileMode {
    pub const TYPE_MASK: FileMode = FileMode::DIR
        .union(FileMode::DEVICE)
        .union(FileMode::CHAR_DEVICE)
        .union(FileMode::NAMED_PIPE)
        .union(FileMode::SYMLINK)
        .union(FileMode::SOCKET);

    /// A mode of the given type with `perm & 0o777` permissions
    pub fn new(kind: FileType, perm: u32) -> Self {
        kind.flags() | FileMode::from_bits_truncate(perm & PERMISSION_MASK)
    }

    pub fn file_type(self) -> FileType {
        TYPE_PRECEDENCE
            .iter()
            .find(|rule| (rule.matches)(self))
            .map(|rule| rule.kind)
            .unwrap_or(FileType::Regular)
    }

    /// The nine rwx bits
    pub fn permissions(self) -> u32 {
        self.bits() & PERMISSION_MASK
    }

    pub fn is_dir(self) -> bool {
        self.file_type() == FileType::Directory
    }

    /// True when the type flags describe exactly one type and no unknown bits
    /// are set; only such modes are guaranteed to survive encode/decode.
    pub fn is_legal(self) -> bool {
        if FileMode::from_bits(self.bits()).is_none() {
            return false;
        }
        let type_bits = self.intersection(FileMode::TYPE_MASK);
        FileType::ALL.iter().any(|kind| kind.flags() == type_bits)
    }
}

impl fmt::Display for FileMode {
    /// `ls -l` style, e.g. `drwxr-xr-t`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.file_type() {
            FileType::Regular => '-',
            FileType::Directory => 'd',
            FileType::CharDevice => 'c',
            FileType::BlockDevice => 'b',
            FileType::NamedPipe => 'p',
            FileType::Symlink => 'l',
            FileType::Socket => 's',
        };
        let perm = self.permissions();
        let triad = |shift: u32, special: bool, set_char: char| {
            let bits = (perm >> shift) & 0o7;
            let r = if bits & 0o4 != 0 { 'r' } else { '-' };
            let w = if bits & 0o2 != 0 { 'w' } else { '-' };
            let x = match (bits & 0o1 != 0, special) {
                (true, true) => set_char,
                (false, true) => set_char.to_ascii_uppercase(),
                (true, false) => 'x',
                (false, false) => '-',
            };
            [r, w, x]
        };

        let mut out = String::with_capacity(10);
        out.push(kind);
        out.extend(triad(6, self.contains(FileMode::SETUID), 's'));
        out.extend(triad(3, self.contains(FileMode::SETGID), 's'));
        out.extend(triad(0, self.contains(FileMode::STICKY), 't'));
        f.write_str(&out)
    }
}

/// Host mode to kernel `st_mode`
pub fn encode(mode: FileMode) -> u32 {
    let mut out = mode.file_type().kernel_bits() | mode.permissions();
    if mode.contains(FileMode::SETUID) {
        out |= S_ISUID;
    }
    if mode.contains(FileMode::SETGID) {
        out |= S_ISGID;
    }
    if mode.contains(FileMode::STICKY) {
        out |= S_ISVTX;
    }
    out
}

/// Kernel `st_mode` to host mode
///
/// Type bits that match none of the seven defined types decode as
/// [`UNKNOWN_TYPE_FALLBACK`] instead of failing.
pub fn decode(raw: u32) -> FileMode {
    let type_flags = match FileType::from_kernel_bits(raw) {
        Some(kind) => kind.flags(),
        None => {
            debug!(
                target: "fusewire::mode",
                raw_mode = raw,
                "unrecognized file type bits; classifying as device"
            );
            UNKNOWN_TYPE_FALLBACK
        }
    };

    let mut mode = type_flags | FileMode::from_bits_truncate(raw & PERMISSION_MASK);
    if raw & S_ISUID != 0 {
        mode |= FileMode::SETUID;
    }
    if raw & S_ISGID != 0 {
        mode |= FileMode::SETGID;
    }
    if raw & S_ISVTX != 0 {
        mode |= FileMode::STICKY;
    }
    mode
}
