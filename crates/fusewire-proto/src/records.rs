// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Fixed-layout kernel records: `fuse_attr`, `fuse_attr_out`, `fuse_entry_out`,
//! `fuse_dirent`
//!
//! Each record knows its own field order and writes every field at its
//! documented offset with an explicit width, in host byte order as the kernel
//! expects. Encoding and decoding both check the slice length up front and
//! never write a partial record.

use crate::consts::DIRENT_HEADER_SIZE;
use crate::error::{RecordError, RecordResult};
use crate::layout::AbiFlavor;
use byteorder::{ByteOrder, NativeEndian};

/// A (seconds, nanoseconds) pair as carried on the wire
///
/// Used both for absolute timestamps (since the Unix epoch) and for relative
/// cache-validity windows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KernelTime {
    pub secs: u64,
    /// Always below 1_000_000_000 when produced by the codecs
    pub nsecs: u32,
}

impl KernelTime {
    pub const ZERO: KernelTime = KernelTime { secs: 0, nsecs: 0 };

    pub const fn new(secs: u64, nsecs: u32) -> Self {
        Self { secs, nsecs }
    }
}

/// `fuse_attr`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttrRecord {
    pub ino: u64,
    pub size: u64,
    pub blocks: u64,
    pub atime: KernelTime,
    pub mtime: KernelTime,
    pub ctime: KernelTime,
    /// Only transmitted in the Darwin flavor
    pub crtime: KernelTime,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub rdev: u32,
    pub blksize: u32,
    pub flags: u32,
}

impl AttrRecord {
    pub const fn encoded_len(flavor: AbiFlavor) -> usize {
        flavor.attr_size()
    }

    /// Serialize into the front of `buf`, returning the bytes written
    pub fn encode_into(&self, flavor: AbiFlavor, buf: &mut [u8]) -> RecordResult<usize> {
        let mut w = FieldWriter::new(buf, flavor.attr_size())?;
        self.write_fields(flavor, &mut w);
        Ok(w.finish())
    }

    /// Parse from the front of `buf`
    pub fn decode_from(flavor: AbiFlavor, buf: &[u8]) -> RecordResult<Self> {
        let mut r = FieldReader::new(buf, flavor.attr_size())?;
        Ok(Self::read_fields(flavor, &mut r))
    }

    fn write_fields(&self, flavor: AbiFlavor, w: &mut FieldWriter<'_>) {
        w.u64(self.ino);
        w.u64(self.size);
        w.u64(self.blocks);
        w.u64(self.atime.secs);
        w.u64(self.mtime.secs);
        w.u64(self.ctime.secs);
        match flavor {
            AbiFlavor::Linux => {
                w.u32(self.atime.nsecs);
                w.u32(self.mtime.nsecs);
                w.u32(self.ctime.nsecs);
                w.u32(self.mode);
                w.u32(self.nlink);
                w.u32(self.uid);
                w.u32(self.gid);
                w.u32(self.rdev);
                w.u32(self.blksize);
                w.u32(self.flags);
            }
            AbiFlavor::Darwin => {
                w.u64(self.crtime.secs);
                w.u32(self.atime.nsecs);
                w.u32(self.mtime.nsecs);
                w.u32(self.ctime.nsecs);
                w.u32(self.crtime.nsecs);
                w.u32(self.mode);
                w.u32(self.nlink);
                w.u32(self.uid);
                w.u32(self.gid);
                w.u32(self.rdev);
                w.u32(self.flags);
                w.u32(self.blksize);
                w.u32(0); // padding
            }
        }
    }

    fn read_fields(flavor: AbiFlavor, r: &mut FieldReader<'_>) -> Self {
        let ino = r.u64();
        let size = r.u64();
        let blocks = r.u64();
        let atime_secs = r.u64();
        let mtime_secs = r.u64();
        let ctime_secs = r.u64();
        match flavor {
            AbiFlavor::Linux => {
                let atime = KernelTime::new(atime_secs, r.u32());
                let mtime = KernelTime::new(mtime_secs, r.u32());
                let ctime = KernelTime::new(ctime_secs, r.u32());
                Self {
                    ino,
                    size,
                    blocks,
                    atime,
                    mtime,
                    ctime,
                    crtime: KernelTime::ZERO,
                    mode: r.u32(),
                    nlink: r.u32(),
                    uid: r.u32(),
                    gid: r.u32(),
                    rdev: r.u32(),
                    blksize: r.u32(),
                    flags: r.u32(),
                }
            }
            AbiFlavor::Darwin => {
                let crtime_secs = r.u64();
                let atime = KernelTime::new(atime_secs, r.u32());
                let mtime = KernelTime::new(mtime_secs, r.u32());
                let ctime = KernelTime::new(ctime_secs, r.u32());
                let crtime = KernelTime::new(crtime_secs, r.u32());
                let mode = r.u32();
                let nlink = r.u32();
                let uid = r.u32();
                let gid = r.u32();
                let rdev = r.u32();
                let flags = r.u32();
                let blksize = r.u32();
                let _padding = r.u32();
                Self {
                    ino,
                    size,
                    blocks,
                    atime,
                    mtime,
                    ctime,
                    crtime,
                    mode,
                    nlink,
                    uid,
                    gid,
                    rdev,
                    blksize,
                    flags,
                }
            }
        }
    }
}

/// `fuse_attr_out`: the reply to GETATTR and SETATTR
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttrOutRecord {
    pub attr_valid: KernelTime,
    pub attr: AttrRecord,
}

impl AttrOutRecord {
    pub const fn encoded_len(flavor: AbiFlavor) -> usize {
        16 + flavor.attr_size()
    }

    pub fn encode_into(&self, flavor: AbiFlavor, buf: &mut [u8]) -> RecordResult<usize> {
        let mut w = FieldWriter::new(buf, Self::encoded_len(flavor))?;
        w.u64(self.attr_valid.secs);
        w.u32(self.attr_valid.nsecs);
        w.u32(0); // dummy
        self.attr.write_fields(flavor, &mut w);
        Ok(w.finish())
    }

    pub fn decode_from(flavor: AbiFlavor, buf: &[u8]) -> RecordResult<Self> {
        let mut r = FieldReader::new(buf, Self::encoded_len(flavor))?;
        let secs = r.u64();
        let attr_valid = KernelTime::new(secs, r.u32());
        let _dummy = r.u32();
        Ok(Self {
            attr_valid,
            attr: AttrRecord::read_fields(flavor, &mut r),
        })
    }
}

/// `fuse_entry_out`: the reply to LOOKUP and the prefix of each READDIRPLUS entry
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EntryRecord {
    pub nodeid: u64,
    pub generation: u64,
    /// How long the kernel may cache the name -> node binding
    pub entry_valid: KernelTime,
    /// How long the kernel may cache `attr`
    pub attr_valid: KernelTime,
    pub attr: AttrRecord,
}

impl EntryRecord {
    pub const fn encoded_len(flavor: AbiFlavor) -> usize {
        flavor.entry_size()
    }

    pub fn encode_into(&self, flavor: AbiFlavor, buf: &mut [u8]) -> RecordResult<usize> {
        let mut w = FieldWriter::new(buf, flavor.entry_size())?;
        w.u64(self.nodeid);
        w.u64(self.generation);
        w.u64(self.entry_valid.secs);
        w.u64(self.attr_valid.secs);
        w.u32(self.entry_valid.nsecs);
        w.u32(self.attr_valid.nsecs);
        self.attr.write_fields(flavor, &mut w);
        Ok(w.finish())
    }

    pub fn decode_from(flavor: AbiFlavor, buf: &[u8]) -> RecordResult<Self> {
        let mut r = FieldReader::new(buf, flavor.entry_size())?;
        let nodeid = r.u64();
        let generation = r.u64();
        let entry_valid_secs = r.u64();
        let attr_valid_secs = r.u64();
        let entry_valid = KernelTime::new(entry_valid_secs, r.u32());
        let attr_valid = KernelTime::new(attr_valid_secs, r.u32());
        let attr = AttrRecord::read_fields(flavor, &mut r);
        Ok(Self {
            nodeid,
            generation,
            entry_valid,
            attr_valid,
            attr,
        })
    }
}

/// `fuse_dirent` without its trailing name
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirentHeader {
    pub ino: u64,
    /// Offset of the entry following this one
    pub off: u64,
    pub namelen: u32,
    /// One of the `DT_*` codes
    pub typ: u32,
}

impl DirentHeader {
    pub const SIZE: usize = DIRENT_HEADER_SIZE;

    pub fn encode_into(&self, buf: &mut [u8]) -> RecordResult<usize> {
        let mut w = FieldWriter::new(buf, Self::SIZE)?;
        w.u64(self.ino);
        w.u64(self.off);
        w.u32(self.namelen);
        w.u32(self.typ);
        Ok(w.finish())
    }

    pub fn decode_from(buf: &[u8]) -> RecordResult<Self> {
        let mut r = FieldReader::new(buf, Self::SIZE)?;
        Ok(Self {
            ino: r.u64(),
            off: r.u64(),
            namelen: r.u32(),
            typ: r.u32(),
        })
    }
}

fn ensure_len(needed: usize, available: usize) -> RecordResult<()> {
    if available < needed {
        return Err(RecordError::BufferTooSmall { needed, available });
    }
    Ok(())
}

/// Sequential field writer over a slice whose length was checked on creation
struct FieldWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8], len: usize) -> RecordResult<Self> {
        ensure_len(len, buf.len())?;
        Ok(Self {
            buf: &mut buf[..len],
            pos: 0,
        })
    }

    fn u64(&mut self, v: u64) {
        NativeEndian::write_u64(&mut self.buf[self.pos..self.pos + 8], v);
        self.pos += 8;
    }

    fn u32(&mut self, v: u32) {
        NativeEndian::write_u32(&mut self.buf[self.pos..self.pos + 4], v);
        self.pos += 4;
    }

    fn finish(self) -> usize {
        debug_assert_eq!(self.pos, self.buf.len(), "record layout length mismatch");
        self.pos
    }
}

struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8], len: usize) -> RecordResult<Self> {
        ensure_len(len, buf.len())?;
        Ok(Self {
            buf: &buf[..len],
            pos: 0,
        })
    }

    fn u64(&mut self) -> u64 {
        let v = NativeEndian::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        v
    }

    fn u32(&mut self) -> u32 {
        let v = NativeEndian::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        v
    }
}
