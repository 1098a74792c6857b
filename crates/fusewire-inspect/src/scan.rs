// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Host directory listing -> abstract inode data

use anyhow::{Context, Result};
use fusewire_core::{mode, Dirent, DirentType, InodeAttributes, InodeId};
use std::fs::{self, Metadata};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// One child of the scanned directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedEntry {
    pub name: Vec<u8>,
    pub inode: InodeId,
    pub attributes: InodeAttributes,
}

impl ScannedEntry {
    /// The dirent at listing position `index`. Its offset names the entry
    /// after it, so a reader resuming from that offset skips this one.
    pub fn dirent(&self, index: usize) -> Dirent {
        let kind = DirentType::from(self.attributes.mode.file_type());
        Dirent::new(index as u64 + 1, self.inode, self.name.clone(), kind)
    }
}

/// List `dir` the way a server would answer READDIR: `.` and `..` first,
/// then the children sorted by name. Symlinks are not followed.
pub fn scan_dir(dir: &Path) -> Result<Vec<ScannedEntry>> {
    let own = fs::metadata(dir).with_context(|| format!("stat {}", dir.display()))?;
    let parent = match dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => {
            fs::metadata(p).with_context(|| format!("stat {}", p.display()))?
        }
        _ => own.clone(),
    };

    let mut children = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry?;
        let meta = entry
            .path()
            .symlink_metadata()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        children.push(scanned(entry.file_name().as_bytes().to_vec(), &meta));
    }
    children.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(dir = %dir.display(), children = children.len(), "scanned directory");

    let mut entries = Vec::with_capacity(children.len() + 2);
    entries.push(scanned(b".".to_vec(), &own));
    entries.push(scanned(b"..".to_vec(), &parent));
    entries.extend(children);
    Ok(entries)
}

fn scanned(name: Vec<u8>, meta: &Metadata) -> ScannedEntry {
    ScannedEntry {
        name,
        inode: InodeId(meta.ino()),
        attributes: attributes_from_metadata(meta),
    }
}

pub fn attributes_from_metadata(meta: &Metadata) -> InodeAttributes {
    InodeAttributes {
        size: meta.size(),
        nlink: u32::try_from(meta.nlink()).unwrap_or(u32::MAX),
        mode: mode::decode(meta.mode()),
        // The kernel record only has room for a 32-bit device number
        rdev: meta.rdev() as u32,
        uid: meta.uid(),
        gid: meta.gid(),
        atime: unix_time(meta.atime(), meta.atime_nsec()),
        mtime: unix_time(meta.mtime(), meta.mtime_nsec()),
        ctime: unix_time(meta.ctime(), meta.ctime_nsec()),
        crtime: meta.created().unwrap_or(UNIX_EPOCH),
    }
}

fn unix_time(secs: i64, nsecs: i64) -> SystemTime {
    let nanos = u32::try_from(nsecs).unwrap_or(0);
    match u64::try_from(secs) {
        Ok(secs) => UNIX_EPOCH + Duration::new(secs, nanos),
        Err(_) => {
            UNIX_EPOCH - Duration::from_secs(secs.unsigned_abs()) + Duration::from_nanos(u64::from(nanos))
        }
    }
}
