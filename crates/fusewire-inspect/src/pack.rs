// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Packing a listing into reply pages

use crate::config::InspectConfig;
use crate::scan::ScannedEntry;
use anyhow::{anyhow, Result};
use fusewire_core::{ChildInodeEntry, Dirent, DirentPage, DirentWriter};
use std::time::SystemTime;
use tracing::debug;

/// Fill pages in listing order, opening a new page whenever an entry does
/// not fit. Mirrors a kernel that keeps issuing READDIR from the last offset.
pub fn pack_pages(
    entries: &[ScannedEntry],
    config: &InspectConfig,
    now: SystemTime,
) -> Result<Vec<DirentPage>> {
    let writer = DirentWriter::new(config.flavor);
    let mut pages = Vec::new();
    let mut page = DirentPage::new(writer, config.page_size);

    for (index, scanned) in entries.iter().enumerate() {
        let dirent = scanned.dirent(index);
        if push(&mut page, scanned, &dirent, config, now) {
            continue;
        }
        if page.is_empty() {
            return Err(too_large(writer, &dirent, config));
        }

        debug!(
            page = pages.len(),
            entries = page.entry_count(),
            bytes = page.len(),
            resume_offset = index,
            "page full"
        );
        pages.push(std::mem::replace(&mut page, DirentPage::new(writer, config.page_size)));
        if !push(&mut page, scanned, &dirent, config, now) {
            return Err(too_large(writer, &dirent, config));
        }
    }

    if !page.is_empty() {
        pages.push(page);
    }
    Ok(pages)
}

fn too_large(writer: DirentWriter, dirent: &Dirent, config: &InspectConfig) -> anyhow::Error {
    anyhow!(
        "entry {:?} needs {} bytes but a page holds only {}",
        String::from_utf8_lossy(&dirent.name),
        writer.required_len(dirent, config.readdir_plus),
        config.page_size
    )
}

fn push(
    page: &mut DirentPage,
    scanned: &ScannedEntry,
    dirent: &Dirent,
    config: &InspectConfig,
    now: SystemTime,
) -> bool {
    if !config.readdir_plus {
        return page.push(dirent);
    }
    let entry = ChildInodeEntry {
        child: scanned.inode,
        generation: 0,
        attributes: scanned.attributes,
        attributes_expiration: now + config.cache.attr_ttl(),
        entry_expiration: now + config.cache.entry_ttl(),
    };
    page.push_plus(&entry, dirent, now)
}
