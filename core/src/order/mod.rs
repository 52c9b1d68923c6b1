//! Boot order index
//!
//! The `bootorder` config file lists device path globs, one per line, most
//! preferred first. A device's priority is the 1-based line number of the
//! first line it matches.
//!
//! ```text
//! /pci@i0cf8/*@1,1/drive@0/disk@0      -> 1
//! /pci@i0cf8/usb@1d,7/storage@2/*@0/*@0,0  -> 2
//! HALT                                  -> 3
//! ```

pub mod devpath;
pub mod glob;
pub mod lookup;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::{BootError, Result};

pub use devpath::{build_pci_path, build_usb_path, PciDevice, UsbDevice, UsbHub, FW_PCI_DOMAIN};
pub use glob::{glob_match, glob_prefix};

/// Boot precedence; smaller boots first
pub type Priority = i32;

/// Parsed `bootorder` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootOrder {
    entries: Vec<String>,
}

impl BootOrder {
    /// Parse the raw file. A missing file yields an empty index and every
    /// lookup falls back to kind defaults.
    pub fn load(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            log::debug!("{}", BootError::ConfigAbsent);
            return Self::default();
        };

        match Self::parse(raw) {
            Ok(order) => order,
            Err(e) => {
                log::warn!("WARNING - Unable to allocate resource: {}", e);
                Self::default()
            }
        }
    }

    /// Split on newlines and trim trailing whitespace from each line.
    /// Empty or all-whitespace text yields an empty index.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        let count = raw.split('\n').count();
        let mut entries = Vec::new();
        entries
            .try_reserve_exact(count)
            .map_err(|_| BootError::AllocationFailure)?;

        log::info!("boot order:");
        for (i, line) in raw.split('\n').enumerate() {
            let line = line.trim_end();
            log::info!("{}: {}", i + 1, line);
            entries.push(line.to_string());
        }
        Ok(Self { entries })
    }

    /// Rank of the first entry matching `glob` in either direction.
    /// Blank lines keep their rank but never match.
    pub fn find_priority(&self, glob: &str) -> Result<Priority> {
        log::info!("Searching bootorder for: {}", glob);
        self.entries
            .iter()
            .position(|entry| !entry.is_empty() && glob_match(glob, entry))
            .map(|i| i as Priority + 1)
            .ok_or(BootError::NoMatch)
    }

    /// Rank of the `HALT` stop marker, if configured
    pub fn find_halt(&self) -> Option<Priority> {
        self.find_priority("HALT").ok()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
