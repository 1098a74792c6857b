// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Inspector configuration

use anyhow::{Context, Result};
use fusewire_core::AbiFlavor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Environment switch that forces READDIRPLUS output
pub const READDIR_PLUS_ENV: &str = "FUSEWIRE_READDIR_PLUS";

/// Cache lifetimes the inspector hands out, playing the server's role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub attr_ttl_ms: u64,
    pub entry_ttl_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            attr_ttl_ms: 1000,
            entry_ttl_ms: 1000,
        }
    }
}

impl CacheConfig {
    pub fn attr_ttl(&self) -> Duration {
        Duration::from_millis(self.attr_ttl_ms)
    }

    pub fn entry_ttl(&self) -> Duration {
        Duration::from_millis(self.entry_ttl_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectConfig {
    pub cache: CacheConfig,
    /// Bytes per reply page, i.e. the size the kernel asks for
    pub page_size: usize,
    pub readdir_plus: bool,
    pub flavor: AbiFlavor,
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            page_size: 4096,
            readdir_plus: false,
            flavor: AbiFlavor::host(),
        }
    }
}

pub fn load_config(config_path: Option<&Path>) -> Result<InspectConfig> {
    match config_path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            let config: InspectConfig = serde_json::from_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?;
            Ok(config)
        }
        None => Ok(InspectConfig::default()),
    }
}

/// `1` or `true` (any case) turns the flag on
pub fn env_flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}
