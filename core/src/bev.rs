//! BEV sequencer
//!
//! Flattens the sorted candidate registry into the list of boot execution
//! vectors the executor walks. Drive mapping side effects (BCV calls, disk
//! and CD-ROM drive mapping) happen here, in boot order.

use heapless::Vec;

use crate::candidate::{BootCandidate, BootKind, BootRegistry, DriveRef, Payload, PayloadRef, SegOff};
use crate::order::BootOrder;
use crate::platform::DriveMapper;

/// Capacity of the flattened list; later entries are dropped
pub const MAX_BEV: usize = 20;

/// One executable boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BevEntry {
    /// First floppy drive
    Floppy,
    /// Hard disk mapped to a runtime drive id
    HardDisk { drive_id: u32 },
    CdRom(DriveRef),
    Cbfs(PayloadRef),
    /// Option ROM entry point
    Rom(SegOff),
    /// Stop here and fail the boot
    Halt,
}

impl BevEntry {
    pub const fn kind(&self) -> BootKind {
        match self {
            Self::Floppy => BootKind::Floppy,
            Self::HardDisk { .. } => BootKind::HardDisk,
            Self::CdRom(_) => BootKind::CdRom,
            Self::Cbfs(_) => BootKind::Cbfs,
            Self::Rom(_) => BootKind::Bev,
            Self::Halt => BootKind::Halt,
        }
    }
}

/// Fixed-capacity flattened boot list
#[derive(Debug, Clone, Default)]
pub struct BevList {
    entries: Vec<BevEntry, MAX_BEV>,
    have_floppy: bool,
}

impl BevList {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            have_floppy: false,
        }
    }

    /// Append an entry. Only the first floppy is kept, and a full list
    /// drops the entry silently. Returns whether it was stored.
    pub fn push(&mut self, entry: BevEntry) -> bool {
        if entry == BevEntry::Floppy {
            if self.have_floppy {
                return false;
            }
            // Counted even when the list is full
            self.have_floppy = true;
        }
        self.entries.push(entry).is_ok()
    }

    pub fn contains_kind(&self, kind: BootKind) -> bool {
        self.entries.iter().any(|e| e.kind() == kind)
    }

    pub fn get(&self, seq: usize) -> Option<&BevEntry> {
        self.entries.get(seq)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, BevEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Map drives and build the BEV list from the current registry order.
///
/// Registers the `HALT` stop marker first if the boot order names one, so
/// it sorts in among the real candidates.
pub fn flatten<M: DriveMapper + ?Sized>(
    registry: &mut BootRegistry,
    order: &BootOrder,
    mapper: &mut M,
) -> BevList {
    if let Some(prio) = order.find_halt() {
        if !registry.iter().any(|c| c.kind == BootKind::Halt) {
            if let Err(e) = registry.add_halt(prio) {
                log::warn!("HALT marker not registered: {}", e);
            }
        }
    }

    let mut list = BevList::new();
    for candidate in registry.iter() {
        match map_candidate(candidate, mapper) {
            Some(entry) => {
                list.push(entry);
            }
            None => log::warn!(
                "Skipping {}: {} without a usable payload",
                candidate.description,
                candidate.kind.as_str()
            ),
        }
    }

    // Legacy callers expect a floppy and a hard disk vector
    list.push(BevEntry::Floppy);
    if !list.contains_kind(BootKind::HardDisk) {
        list.push(BevEntry::HardDisk { drive_id: 0 });
    }

    log::debug!("BEV list: {} entries", list.len());
    list
}

fn map_candidate<M: DriveMapper + ?Sized>(
    candidate: &BootCandidate,
    mapper: &mut M,
) -> Option<BevEntry> {
    let entry = match (candidate.kind, candidate.payload) {
        (BootKind::Bcv, Payload::Vector(vector)) => {
            mapper.call_bcv(vector);
            BevEntry::HardDisk { drive_id: 0 }
        }
        (BootKind::Floppy, Payload::Drive(drive)) => {
            mapper.map_floppy(&drive);
            BevEntry::Floppy
        }
        (BootKind::HardDisk, Payload::Drive(drive)) => BevEntry::HardDisk {
            drive_id: mapper.map_hard_disk(&drive),
        },
        (BootKind::CdRom, Payload::Drive(drive)) => {
            mapper.map_cdrom(&drive);
            BevEntry::CdRom(drive)
        }
        (BootKind::Cbfs, Payload::File(file)) => BevEntry::Cbfs(file),
        (BootKind::Bev, Payload::Vector(vector)) => BevEntry::Rom(vector),
        (BootKind::Halt, _) => BevEntry::Halt,
        _ => return None,
    };
    Some(entry)
}
