// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Timestamps and cache-validity windows
//!
//! The kernel carries time as an unsigned (seconds, nanoseconds) pair. For
//! attribute timestamps the pair counts from the Unix epoch; for cache
//! validity it is a duration relative to when the reply is sent. Servers work
//! in absolute [`SystemTime`]s for both and the conversion happens here.

use crate::error::{CodecError, CodecResult};
use fusewire_proto::KernelTime;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const NANOS_PER_SEC: u32 = 1_000_000_000;

pub fn duration_to_kernel(d: Duration) -> KernelTime {
    KernelTime::new(d.as_secs(), d.subsec_nanos())
}

/// Absolute timestamp as seconds and nanoseconds since the epoch
///
/// Instants before the epoch are outside the contract and clamp to zero.
pub fn to_kernel_time(t: SystemTime) -> KernelTime {
    t.duration_since(UNIX_EPOCH).map(duration_to_kernel).unwrap_or(KernelTime::ZERO)
}

/// Remaining lifetime of a cache entry that expires at `expiration`
///
/// An expiration at or before `now` yields a zero window; the result never
/// wraps. There is no upper cap: 2^64 seconds outlasts any `SystemTime`.
pub fn expiration_to_relative(expiration: SystemTime, now: SystemTime) -> KernelTime {
    expiration.duration_since(now).map(duration_to_kernel).unwrap_or(KernelTime::ZERO)
}

/// Inverse of [`to_kernel_time`]. Nanoseconds of a second or more carry into
/// the seconds field.
pub fn from_kernel_time(k: KernelTime) -> CodecResult<SystemTime> {
    let secs = k.secs.saturating_add(u64::from(k.nsecs / NANOS_PER_SEC));
    let since_epoch = Duration::new(secs, k.nsecs % NANOS_PER_SEC);
    UNIX_EPOCH
        .checked_add(since_epoch)
        .ok_or(CodecError::TimeOutOfRange { secs })
}
