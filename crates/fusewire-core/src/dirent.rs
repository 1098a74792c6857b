// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Directory entries -> READDIR / READDIRPLUS reply bytes
//!
//! A READDIR reply is a packed run of `fuse_dirent` records, each followed by
//! its name and zero padding up to an 8-byte boundary. READDIRPLUS prefixes
//! every record with a full `fuse_entry_out`. Entries are written one at a
//! time into whatever space the caller has left; an entry that does not fit
//! writes nothing and reports 0, which ends the current reply.

use crate::entry::encode_child_entry;
use crate::error::{CodecError, CodecResult};
use crate::types::{ChildInodeEntry, Dirent};
use fusewire_proto::{
    dirent_len, dirent_padding, AbiFlavor, DirentHeader, EntryRecord, RecordResult,
};
use std::time::SystemTime;
use tracing::{trace, warn};

/// Serializes directory entries for one ABI flavor
///
/// Holds no state besides the flavor; the size of the READDIRPLUS prefix is
/// fixed by it and no feature negotiation happens here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirentWriter {
    flavor: AbiFlavor,
}

impl DirentWriter {
    pub fn new(flavor: AbiFlavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> AbiFlavor {
        self.flavor
    }

    /// Append a READDIR entry at the front of `buf`
    ///
    /// Returns the bytes written, or 0 without touching `buf` when the entry
    /// does not fit.
    pub fn write(&self, buf: &mut [u8], dirent: &Dirent) -> usize {
        self.write_record(buf, None, dirent)
    }

    /// Append a READDIRPLUS entry: the lookup result for `entry` followed by
    /// the dirent itself
    pub fn write_plus(
        &self,
        buf: &mut [u8],
        entry: &ChildInodeEntry,
        dirent: &Dirent,
        now: SystemTime,
    ) -> usize {
        let record = encode_child_entry(entry, now);
        self.write_record(buf, Some(&record), dirent)
    }

    /// Bytes `dirent` would occupy, with or without an entry prefix
    pub fn required_len(&self, dirent: &Dirent, plus: bool) -> usize {
        dirent_len(dirent.name.len(), plus.then_some(self.flavor))
    }

    fn write_record(&self, buf: &mut [u8], entry: Option<&EntryRecord>, dirent: &Dirent) -> usize {
        let needed = self.required_len(dirent, entry.is_some());
        if needed > buf.len() {
            trace!(
                target: "fusewire::dirent",
                inode = dirent.inode.0,
                needed,
                available = buf.len(),
                "dirent does not fit"
            );
            return 0;
        }
        // A name longer than u32::MAX cannot fit any kernel buffer either
        let Ok(namelen) = u32::try_from(dirent.name.len()) else {
            return 0;
        };

        match self.encode_parts(&mut buf[..needed], entry, dirent, namelen) {
            Ok(written) => written,
            Err(err) => {
                warn!(target: "fusewire::dirent", %err, "dirent encoding failed after size check");
                0
            }
        }
    }

    fn encode_parts(
        &self,
        out: &mut [u8],
        entry: Option<&EntryRecord>,
        dirent: &Dirent,
        namelen: u32,
    ) -> RecordResult<usize> {
        let mut n = 0;
        if let Some(record) = entry {
            n += record.encode_into(self.flavor, &mut out[n..])?;
        }

        let header = DirentHeader {
            ino: dirent.inode.0,
            off: dirent.offset.0,
            namelen,
            typ: dirent.kind.as_raw(),
        };
        n += header.encode_into(&mut out[n..])?;

        out[n..n + dirent.name.len()].copy_from_slice(&dirent.name);
        n += dirent.name.len();

        let padding = dirent_padding(dirent.name.len());
        out[n..n + padding].fill(0);
        Ok(n + padding)
    }
}

/// One fixed-capacity reply page that entries are appended to in order
///
/// This is the dispatch-side loop around [`DirentWriter`]: keep pushing until
/// a push returns `false`, send [`DirentPage::as_bytes`], and resume the next
/// request from the rejected entry.
#[derive(Clone, Debug)]
pub struct DirentPage {
    writer: DirentWriter,
    buf: Vec<u8>,
    len: usize,
    entries: usize,
}

impl DirentPage {
    pub fn new(writer: DirentWriter, capacity: usize) -> Self {
        Self {
            writer,
            buf: vec![0; capacity],
            len: 0,
            entries: 0,
        }
    }

    pub fn push(&mut self, dirent: &Dirent) -> bool {
        let n = self.writer.write(&mut self.buf[self.len..], dirent);
        self.advance(n)
    }

    pub fn push_plus(&mut self, entry: &ChildInodeEntry, dirent: &Dirent, now: SystemTime) -> bool {
        let n = self.writer.write_plus(&mut self.buf[self.len..], entry, dirent, now);
        self.advance(n)
    }

    fn advance(&mut self, n: usize) -> bool {
        if n == 0 {
            return false;
        }
        self.len += n;
        self.entries += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.len
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn into_bytes(mut self) -> Vec<u8> {
        self.buf.truncate(self.len);
        self.buf
    }
}

/// One entry parsed back out of a reply buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedDirent<'a> {
    /// Present for READDIRPLUS buffers
    pub entry: Option<EntryRecord>,
    pub header: DirentHeader,
    pub name: &'a [u8],
}

/// Walks a filled READDIR or READDIRPLUS buffer
///
/// Stops after the first malformed record.
#[derive(Clone, Debug)]
pub struct DirentIter<'a> {
    buf: &'a [u8],
    pos: usize,
    plus: Option<AbiFlavor>,
}

impl<'a> DirentIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, plus: None }
    }

    pub fn new_plus(buf: &'a [u8], flavor: AbiFlavor) -> Self {
        Self {
            buf,
            pos: 0,
            plus: Some(flavor),
        }
    }

    fn next_record(&mut self) -> CodecResult<DecodedDirent<'a>> {
        let start = self.pos;
        let mut at = start;

        let entry = match self.plus {
            Some(flavor) => {
                let record = EntryRecord::decode_from(flavor, &self.buf[at..])?;
                at += EntryRecord::encoded_len(flavor);
                Some(record)
            }
            None => None,
        };

        let header = DirentHeader::decode_from(&self.buf[at..])?;
        at += DirentHeader::SIZE;

        let namelen = header.namelen as usize;
        let available = self.buf.len() - at;
        if namelen > available {
            return Err(CodecError::TruncatedName {
                at: start,
                namelen,
                available,
            });
        }
        let name = &self.buf[at..at + namelen];

        // The final record may omit trailing padding
        self.pos = (at + namelen + dirent_padding(namelen)).min(self.buf.len());
        Ok(DecodedDirent {
            entry,
            header,
            name,
        })
    }
}

impl<'a> Iterator for DirentIter<'a> {
    type Item = CodecResult<DecodedDirent<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let item = self.next_record();
        if item.is_err() {
            self.pos = self.buf.len();
        }
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{FileMode, FileType};
    use crate::types::{DirentType, InodeAttributes, InodeId};
    use fusewire_proto::{KernelTime, DT_REG};
    use std::time::{Duration, UNIX_EPOCH};

    fn abc() -> Dirent {
        Dirent::new(100, InodeId(5), "abc", DirentType::Regular)
    }

    #[test]
    fn three_byte_name_needs_32_bytes() {
        let writer = DirentWriter::new(AbiFlavor::Linux);

        let mut exact = [0xEEu8; 32];
        assert_eq!(writer.write(&mut exact, &abc()), 32);

        let mut short = [0xEEu8; 31];
        assert_eq!(writer.write(&mut short, &abc()), 0);
        assert!(short.iter().all(|b| *b == 0xEE));
    }

    #[test]
    fn writes_header_name_and_zero_padding() {
        let writer = DirentWriter::new(AbiFlavor::Linux);
        let mut buf = [0xEEu8; 64];
        let n = writer.write(&mut buf, &abc());
        assert_eq!(n, 32);

        assert_eq!(&buf[0..8], &5u64.to_ne_bytes());
        assert_eq!(&buf[8..16], &100u64.to_ne_bytes());
        assert_eq!(&buf[16..20], &3u32.to_ne_bytes());
        assert_eq!(&buf[20..24], &DT_REG.to_ne_bytes());
        assert_eq!(&buf[24..27], b"abc");
        assert_eq!(&buf[27..32], &[0u8; 5]);
        // Nothing past the record is touched
        assert!(buf[32..].iter().all(|b| *b == 0xEE));
    }

    #[test]
    fn padding_for_boundary_lengths() {
        let writer = DirentWriter::new(AbiFlavor::Linux);
        let mut buf = [0u8; 64];
        for (len, expected) in [(0usize, 24usize), (8, 32), (9, 40)] {
            let dirent = Dirent::new(1, InodeId(2), vec![b'x'; len], DirentType::Unknown);
            assert_eq!(writer.write(&mut buf, &dirent), expected, "name length {}", len);
        }
    }

    #[test]
    fn plus_mode_prefixes_entry_record() {
        for flavor in [AbiFlavor::Linux, AbiFlavor::Darwin] {
            let writer = DirentWriter::new(flavor);
            let now = UNIX_EPOCH + Duration::from_secs(100);
            let entry = ChildInodeEntry {
                child: InodeId(5),
                generation: 2,
                attributes: InodeAttributes {
                    size: 3,
                    nlink: 1,
                    mode: FileMode::new(FileType::Regular, 0o644),
                    ..Default::default()
                },
                attributes_expiration: now + Duration::from_secs(1),
                entry_expiration: now + Duration::from_secs(2),
            };

            let mut buf = vec![0u8; 512];
            let n = writer.write_plus(&mut buf, &entry, &abc(), now);
            assert_eq!(n, flavor.entry_size() + 32);

            let decoded: Vec<_> = DirentIter::new_plus(&buf[..n], flavor).collect();
            assert_eq!(decoded.len(), 1);
            let item = decoded[0].as_ref().unwrap();
            let record = item.entry.unwrap();
            assert_eq!(record.nodeid, 5);
            assert_eq!(record.entry_valid, KernelTime::new(2, 0));
            assert_eq!(record.attr_valid, KernelTime::new(1, 0));
            assert_eq!(item.header.ino, 5);
            assert_eq!(item.name, b"abc");
        }
    }

    #[test]
    fn plus_mode_rejects_when_only_plain_record_fits() {
        let writer = DirentWriter::new(AbiFlavor::Linux);
        let entry = ChildInodeEntry::uncached(InodeId(5), InodeAttributes::default());
        let mut buf = [0u8; 128 + 31];
        assert_eq!(writer.write_plus(&mut buf, &entry, &abc(), UNIX_EPOCH), 0);
        assert_eq!(writer.write(&mut buf, &abc()), 32);
    }

    #[test]
    fn page_stops_at_first_entry_that_does_not_fit() {
        let mut page = DirentPage::new(DirentWriter::new(AbiFlavor::Linux), 80);
        let names = ["one", "two", "three"];
        let mut accepted = 0;
        for (i, name) in names.iter().enumerate() {
            let dirent = Dirent::new(i as u64 + 1, InodeId(10 + i as u64), *name, DirentType::Regular);
            if !page.push(&dirent) {
                break;
            }
            accepted += 1;
        }
        assert_eq!(accepted, 2);
        assert_eq!(page.entry_count(), 2);
        assert_eq!(page.len(), 64);
        assert_eq!(page.remaining(), 16);

        let names: Vec<Vec<u8>> = DirentIter::new(page.as_bytes())
            .map(|item| item.unwrap().name.to_vec())
            .collect();
        assert_eq!(names, vec![b"one".to_vec(), b"two".to_vec()]);
    }

    #[test]
    fn iterator_reports_truncated_name() {
        let header = DirentHeader {
            ino: 1,
            off: 1,
            namelen: 40,
            typ: 0,
        };
        let mut buf = [0u8; 32];
        header.encode_into(&mut buf).unwrap();

        let mut iter = DirentIter::new(&buf);
        assert!(matches!(
            iter.next(),
            Some(Err(CodecError::TruncatedName { namelen: 40, available: 8, .. }))
        ));
        assert!(iter.next().is_none());
    }
}
