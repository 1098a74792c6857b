// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use fusewire_core::mode::{self, FileMode, FileType};
use fusewire_core::proto::{dirent_len, dirent_padding, AbiFlavor, DIRENT_ALIGN};
use fusewire_core::time::{expiration_to_relative, from_kernel_time, to_kernel_time};
use fusewire_core::{Dirent, DirentType, DirentWriter, InodeId};
use proptest::prelude::*;
use std::time::{Duration, UNIX_EPOCH};

const HUNDRED_YEARS: u64 = 100 * 365 * 24 * 60 * 60;

fn file_type() -> impl Strategy<Value = FileType> {
    proptest::sample::select(FileType::ALL.to_vec())
}

fn legal_mode() -> impl Strategy<Value = FileMode> {
    (file_type(), 0u32..=0o777, any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(kind, perm, setuid, setgid, sticky)| {
            let mut mode = FileMode::new(kind, perm);
            mode.set(FileMode::SETUID, setuid);
            mode.set(FileMode::SETGID, setgid);
            mode.set(FileMode::STICKY, sticky);
            mode
        },
    )
}

proptest! {
    #[test]
    fn kernel_nanoseconds_stay_below_one_second(secs in 0u64..(1 << 40), nanos in 0u32..1_000_000_000) {
        let k = to_kernel_time(UNIX_EPOCH + Duration::new(secs, nanos));
        prop_assert!(k.nsecs < 1_000_000_000);
        prop_assert_eq!(k.secs, secs);
        prop_assert_eq!(k.nsecs, nanos);
        prop_assert_eq!(from_kernel_time(k).unwrap(), UNIX_EPOCH + Duration::new(secs, nanos));
    }

    #[test]
    fn past_expirations_give_zero_window(now_secs in 0u64..(1 << 40), back in 0u64..HUNDRED_YEARS, back_nanos in 0u32..1_000_000_000) {
        let now = UNIX_EPOCH + Duration::from_secs(now_secs) + Duration::from_secs(HUNDRED_YEARS);
        let expiration = now - Duration::new(back, back_nanos);
        let window = expiration_to_relative(expiration, now);
        prop_assert_eq!((window.secs, window.nsecs), (0, 0));
    }

    #[test]
    fn future_windows_are_exact(now_secs in 0u64..(1 << 40), ahead in 0u64..HUNDRED_YEARS, ahead_nanos in 0u32..1_000_000_000) {
        let now = UNIX_EPOCH + Duration::from_secs(now_secs);
        let window = expiration_to_relative(now + Duration::new(ahead, ahead_nanos), now);
        prop_assert_eq!(window.secs, ahead);
        prop_assert_eq!(window.nsecs, ahead_nanos);
    }

    #[test]
    fn legal_modes_survive_encode_decode(m in legal_mode()) {
        prop_assert!(m.is_legal());
        prop_assert_eq!(mode::decode(mode::encode(m)), m);
    }

    #[test]
    fn kernel_modes_survive_decode_encode(kind in file_type(), low in 0u32..=0o7777) {
        let raw = kind.kernel_bits() | low;
        prop_assert_eq!(mode::encode(mode::decode(raw)), raw);
    }

    #[test]
    fn encoded_mode_has_exactly_one_type(m in any::<u32>()) {
        let raw = mode::encode(FileMode::from_bits_retain(m));
        prop_assert!(FileType::from_kernel_bits(raw).is_some());
    }

    #[test]
    fn dirent_lengths_are_aligned(namelen in 0usize..4096) {
        let pad = dirent_padding(namelen);
        prop_assert!(pad < DIRENT_ALIGN);
        prop_assert_eq!(dirent_len(namelen, None), 24 + namelen + pad);
        prop_assert_eq!(dirent_len(namelen, None) % DIRENT_ALIGN, 0);
        for flavor in [AbiFlavor::Linux, AbiFlavor::Darwin] {
            let plus = dirent_len(namelen, Some(flavor));
            prop_assert_eq!(plus, flavor.entry_size() + dirent_len(namelen, None));
            prop_assert_eq!(plus % DIRENT_ALIGN, 0);
        }
    }

    #[test]
    fn writer_fills_exactly_or_not_at_all(name in proptest::collection::vec(any::<u8>(), 0..64), room in 0usize..128) {
        let writer = DirentWriter::new(AbiFlavor::Linux);
        let dirent = Dirent::new(7, InodeId(3), name.clone(), DirentType::Regular);
        let needed = dirent_len(name.len(), None);

        let mut buf = vec![0xAAu8; room];
        let written = writer.write(&mut buf, &dirent);
        if needed <= room {
            prop_assert_eq!(written, needed);
            prop_assert!(buf[24 + name.len()..needed].iter().all(|b| *b == 0));
        } else {
            prop_assert_eq!(written, 0);
            prop_assert!(buf.iter().all(|b| *b == 0xAA));
        }
    }
}
