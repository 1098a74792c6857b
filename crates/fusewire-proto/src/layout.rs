// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Record sizes and the attribute-layout flavor

use crate::consts::{DIRENT_ALIGN, DIRENT_HEADER_SIZE};
use crate::error::RecordError;
use serde::{Deserialize, Serialize};

/// Which `fuse_attr` layout the kernel on the other end expects
///
/// Linux kernels use the 88-byte record with three timestamps. macFUSE adds a
/// creation time and BSD file flags, giving a 104-byte record. The flavor is a
/// plain value rather than a `cfg` so both layouts can be produced and tested
/// on any host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiFlavor {
    Linux,
    Darwin,
}

impl AbiFlavor {
    /// Flavor of the kernel this binary was built for
    pub const fn host() -> Self {
        if cfg!(target_os = "macos") {
            AbiFlavor::Darwin
        } else {
            AbiFlavor::Linux
        }
    }

    /// Size of `fuse_attr`
    pub const fn attr_size(self) -> usize {
        match self {
            AbiFlavor::Linux => 88,
            AbiFlavor::Darwin => 104,
        }
    }

    /// Size of `fuse_entry_out`, which embeds a full `fuse_attr`
    pub const fn entry_size(self) -> usize {
        40 + self.attr_size()
    }

    /// Whether the attribute record carries a creation time
    pub const fn has_crtime(self) -> bool {
        matches!(self, AbiFlavor::Darwin)
    }
}

impl Default for AbiFlavor {
    fn default() -> Self {
        Self::host()
    }
}

impl std::fmt::Display for AbiFlavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbiFlavor::Linux => write!(f, "linux"),
            AbiFlavor::Darwin => write!(f, "darwin"),
        }
    }
}

impl std::str::FromStr for AbiFlavor {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(AbiFlavor::Linux),
            "darwin" | "macos" => Ok(AbiFlavor::Darwin),
            _ => Err(RecordError::UnknownFlavor(s.to_string())),
        }
    }
}

/// Zero bytes needed after a name of `namelen` bytes to reach the next
/// dirent boundary
pub const fn dirent_padding(namelen: usize) -> usize {
    (DIRENT_ALIGN - namelen % DIRENT_ALIGN) % DIRENT_ALIGN
}

/// Total bytes one directory entry occupies in a READDIR reply, or in a
/// READDIRPLUS reply when `plus` names the flavor of the embedded entry record
pub const fn dirent_len(namelen: usize, plus: Option<AbiFlavor>) -> usize {
    let base = DIRENT_HEADER_SIZE + namelen + dirent_padding(namelen);
    match plus {
        Some(flavor) => flavor.entry_size() + base,
        None => base,
    }
}
