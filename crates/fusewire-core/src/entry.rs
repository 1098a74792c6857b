// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Lookup results -> `fuse_entry_out`

use crate::attr::encode_attributes;
use crate::time::expiration_to_relative;
use crate::types::ChildInodeEntry;
use fusewire_proto::EntryRecord;
use std::time::SystemTime;

/// Build the kernel entry record for a lookup result
///
/// The name binding and the attribute snapshot get independent windows, since
/// a server may refresh one without the other.
pub fn encode_child_entry(entry: &ChildInodeEntry, now: SystemTime) -> EntryRecord {
    EntryRecord {
        nodeid: entry.child.0,
        generation: entry.generation,
        entry_valid: expiration_to_relative(entry.entry_expiration, now),
        attr_valid: expiration_to_relative(entry.attributes_expiration, now),
        attr: encode_attributes(entry.child, &entry.attributes),
    }
}
