// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Page output formats

use anyhow::Result;
use clap::ValueEnum;
use fusewire_core::proto::EntryRecord;
use fusewire_core::{mode, AbiFlavor, DirentIter, DirentPage, DirentType, KernelTime};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One hex line per page
    Hex,
    /// Decoded entries per page
    Json,
}

#[derive(Debug, Serialize)]
pub struct PageReport {
    pub page: usize,
    pub bytes: usize,
    pub entries: Vec<EntryReport>,
}

#[derive(Debug, Serialize)]
pub struct EntryReport {
    pub inode: u64,
    pub offset: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<DirentType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup: Option<LookupReport>,
}

/// The READDIRPLUS prefix of an entry
#[derive(Debug, Serialize)]
pub struct LookupReport {
    pub generation: u64,
    pub entry_valid: WindowReport,
    pub attr_valid: WindowReport,
    pub mode: String,
    pub size: u64,
    pub blocks: u64,
}

#[derive(Debug, Serialize)]
pub struct WindowReport {
    pub secs: u64,
    pub nsecs: u32,
}

impl From<KernelTime> for WindowReport {
    fn from(t: KernelTime) -> Self {
        Self {
            secs: t.secs,
            nsecs: t.nsecs,
        }
    }
}

impl From<&EntryRecord> for LookupReport {
    fn from(record: &EntryRecord) -> Self {
        Self {
            generation: record.generation,
            entry_valid: record.entry_valid.into(),
            attr_valid: record.attr_valid.into(),
            mode: mode::decode(record.attr.mode).to_string(),
            size: record.attr.size,
            blocks: record.attr.blocks,
        }
    }
}

pub fn render_hex(pages: &[DirentPage], out: &mut impl Write) -> Result<()> {
    for (n, page) in pages.iter().enumerate() {
        writeln!(out, "page {}: {} bytes {}", n, page.len(), hex::encode(page.as_bytes()))?;
    }
    Ok(())
}

/// Parse every page back and describe its entries
pub fn page_reports(pages: &[DirentPage], plus: Option<AbiFlavor>) -> Result<Vec<PageReport>> {
    let mut reports = Vec::with_capacity(pages.len());
    for (n, page) in pages.iter().enumerate() {
        let bytes = page.as_bytes();
        let iter = match plus {
            Some(flavor) => DirentIter::new_plus(bytes, flavor),
            None => DirentIter::new(bytes),
        };
        let mut entries = Vec::new();
        for item in iter {
            let item = item?;
            entries.push(EntryReport {
                inode: item.header.ino,
                offset: item.header.off,
                name: String::from_utf8_lossy(item.name).into_owned(),
                kind: DirentType::from_raw(item.header.typ),
                lookup: item.entry.as_ref().map(LookupReport::from),
            });
        }
        reports.push(PageReport {
            page: n,
            bytes: bytes.len(),
            entries,
        });
    }
    Ok(reports)
}

pub fn render_json(pages: &[DirentPage], plus: Option<AbiFlavor>, out: &mut impl Write) -> Result<()> {
    let reports = page_reports(pages, plus)?;
    writeln!(out, "{}", serde_json::to_string_pretty(&reports)?)?;
    Ok(())
}
