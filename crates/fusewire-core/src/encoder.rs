// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Reply encoding bound to a flavor and a clock

use crate::attr::{encode_attr_out, encode_attributes};
use crate::clock::{Clock, SystemClock};
use crate::dirent::DirentWriter;
use crate::entry::encode_child_entry;
use crate::types::{ChildInodeEntry, Dirent, InodeAttributes, InodeId};
use fusewire_proto::{AbiFlavor, AttrOutRecord, AttrRecord, EntryRecord};
use std::time::SystemTime;

/// Front end for request handlers
///
/// Each call samples the clock exactly once, so every window in one reply is
/// measured from the same instant.
#[derive(Clone, Copy, Debug)]
pub struct ReplyEncoder<C: Clock = SystemClock> {
    writer: DirentWriter,
    clock: C,
}

impl ReplyEncoder<SystemClock> {
    pub fn with_system_clock(flavor: AbiFlavor) -> Self {
        Self::new(flavor, SystemClock)
    }
}

impl<C: Clock> ReplyEncoder<C> {
    pub fn new(flavor: AbiFlavor, clock: C) -> Self {
        Self {
            writer: DirentWriter::new(flavor),
            clock,
        }
    }

    pub fn flavor(&self) -> AbiFlavor {
        self.writer.flavor()
    }

    pub fn dirent_writer(&self) -> DirentWriter {
        self.writer
    }

    /// Attribute record only; nothing here depends on the clock
    pub fn attr(&self, ino: InodeId, attrs: &InodeAttributes) -> AttrRecord {
        encode_attributes(ino, attrs)
    }

    pub fn attr_out(
        &self,
        ino: InodeId,
        attrs: &InodeAttributes,
        expiration: SystemTime,
    ) -> AttrOutRecord {
        encode_attr_out(ino, attrs, expiration, self.clock.now())
    }

    pub fn entry(&self, entry: &ChildInodeEntry) -> EntryRecord {
        encode_child_entry(entry, self.clock.now())
    }

    pub fn dirent(&self, buf: &mut [u8], dirent: &Dirent) -> usize {
        self.writer.write(buf, dirent)
    }

    pub fn dirent_plus(&self, buf: &mut [u8], entry: &ChildInodeEntry, dirent: &Dirent) -> usize {
        self.writer.write_plus(buf, entry, dirent, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::mode::{FileMode, FileType};
    use crate::types::DirentType;
    use fusewire_proto::KernelTime;
    use std::time::{Duration, UNIX_EPOCH};

    fn fixed_clock(at: SystemTime, calls: usize) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_now().times(calls).return_const(at);
        clock
    }

    fn sample_entry(now: SystemTime) -> ChildInodeEntry {
        ChildInodeEntry {
            child: InodeId(9),
            generation: 1,
            attributes: InodeAttributes {
                size: 2048,
                nlink: 2,
                mode: FileMode::new(FileType::Directory, 0o755),
                ..Default::default()
            },
            attributes_expiration: now + Duration::from_secs(3),
            entry_expiration: now + Duration::from_secs(7),
        }
    }

    #[test]
    fn entry_samples_clock_once() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000_000);
        let encoder = ReplyEncoder::new(AbiFlavor::Linux, fixed_clock(now, 1));

        let record = encoder.entry(&sample_entry(now));
        assert_eq!(record.entry_valid, KernelTime::new(7, 0));
        assert_eq!(record.attr_valid, KernelTime::new(3, 0));
        assert_eq!(record.attr.mode, 0o040755);
    }

    #[test]
    fn attr_out_uses_sampled_now() {
        let now = UNIX_EPOCH + Duration::from_secs(500);
        let encoder = ReplyEncoder::new(AbiFlavor::Darwin, fixed_clock(now, 1));
        let attrs = sample_entry(now).attributes;

        let out = encoder.attr_out(InodeId(9), &attrs, now + Duration::from_millis(250));
        assert_eq!(out.attr_valid, KernelTime::new(0, 250_000_000));
        assert_eq!(out.attr.blocks, 4);
    }

    #[test]
    fn plain_paths_never_touch_clock() {
        let encoder = ReplyEncoder::new(AbiFlavor::Linux, fixed_clock(UNIX_EPOCH, 0));
        let attrs = sample_entry(UNIX_EPOCH).attributes;
        assert_eq!(encoder.attr(InodeId(9), &attrs).ino, 9);

        let mut buf = [0u8; 64];
        let dirent = Dirent::new(1, InodeId(9), "d", DirentType::Directory);
        assert_eq!(encoder.dirent(&mut buf, &dirent), 32);
    }

    #[test]
    fn dirent_plus_samples_clock_once() {
        let now = UNIX_EPOCH + Duration::from_secs(42);
        let encoder = ReplyEncoder::new(AbiFlavor::Linux, fixed_clock(now, 1));
        let dirent = Dirent::new(1, InodeId(9), "sub", DirentType::Directory);

        let mut buf = [0u8; 256];
        let n = encoder.dirent_plus(&mut buf, &sample_entry(now), &dirent);
        assert_eq!(n, AbiFlavor::Linux.entry_size() + 32);
    }

    #[test]
    fn system_clock_encoder_is_copy_and_sync() {
        fn assert_traits<T: Copy + Send + Sync>() {}
        assert_traits::<ReplyEncoder<SystemClock>>();
        assert_eq!(
            ReplyEncoder::with_system_clock(AbiFlavor::Darwin).flavor(),
            AbiFlavor::Darwin
        );
    }
}
