// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Source of "now" for cache-window conversion

use std::time::SystemTime;

/// Samples the current wall-clock time
///
/// Samples taken by concurrent requests are unsynchronized and need not be
/// monotonic; they only feed cache-validity windows.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The host's real-time clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
