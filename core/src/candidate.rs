//! Boot candidate registry
//!
//! Device enumeration drivers register every bootable target they find.
//! The list is kept sorted on every insertion so display and flattening
//! can simply walk it front to back.
//!
//! Ordering key, ascending:
//! 1. priority (smaller wins)
//! 2. kind, by its numeric code
//! 3. for Floppy/HardDisk/CdRom only: underlying drive type, then
//!    controller id
//!
//! Candidates comparing equal keep registration order.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;

use crate::error::{BootError, Result};
use crate::order::Priority;

/// Fallback priority for anything without a configured slot
pub const DEFAULT_PRIO: Priority = 9999;

// ═══════════════════════════════════════════════════════════════════════════
// PAYLOAD TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Kind of boot target. Discriminants are the legacy IPL type codes and
/// define the tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum BootKind {
    Floppy = 0x01,
    HardDisk = 0x02,
    CdRom = 0x03,
    Cbfs = 0x20,
    Bev = 0x80,
    Bcv = 0x81,
    Halt = 0xf0,
}

impl BootKind {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Kinds backed by a block drive (subject to the drive tie-break)
    pub const fn is_drive(self) -> bool {
        matches!(self, Self::Floppy | Self::HardDisk | Self::CdRom)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Floppy => "Floppy",
            Self::HardDisk => "Hard Disk",
            Self::CdRom => "DVD/CD",
            Self::Cbfs => "CBFS",
            Self::Bev => "BEV",
            Self::Bcv => "BCV",
            Self::Halt => "HALT",
        }
    }
}

/// Opaque reference to a drive owned by the block layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveRef {
    /// Block layer handle, passed back verbatim to mappers and boot calls
    pub handle: u32,
    /// Underlying drive type code (secondary sort key)
    pub drive_type: u8,
    /// Controller id (tertiary sort key)
    pub cntl_id: u32,
}

impl DriveRef {
    pub const fn new(handle: u32, drive_type: u8, cntl_id: u32) -> Self {
        Self {
            handle,
            drive_type,
            cntl_id,
        }
    }

    fn sort_key(&self) -> (u8, u32) {
        (self.drive_type, self.cntl_id)
    }
}

/// Real-mode segment:offset transfer vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegOff {
    pub seg: u16,
    pub offset: u16,
}

impl SegOff {
    pub const fn new(seg: u16, offset: u16) -> Self {
        Self { seg, offset }
    }

    /// Packed form, offset in the low word
    pub const fn to_u32(self) -> u32 {
        ((self.seg as u32) << 16) | self.offset as u32
    }

    pub const fn from_u32(packed: u32) -> Self {
        Self {
            seg: (packed >> 16) as u16,
            offset: packed as u16,
        }
    }
}

/// Opaque reference to a payload file (CBFS)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRef(pub u32);

/// What a candidate boots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Drive(DriveRef),
    Vector(SegOff),
    File(PayloadRef),
    None,
}

// ═══════════════════════════════════════════════════════════════════════════
// CANDIDATE
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootCandidate {
    pub kind: BootKind,
    pub priority: Priority,
    pub payload: Payload,
    pub description: String,
}

impl BootCandidate {
    pub fn new(kind: BootKind, priority: Priority, payload: Payload, description: &str) -> Self {
        Self {
            kind,
            priority,
            payload,
            description: description.to_string(),
        }
    }

    /// Registration order: `Less` means self goes in front of `other`.
    pub fn order(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then(self.kind.cmp(&other.kind))
            .then_with(|| match (self.payload, other.payload) {
                (Payload::Drive(a), Payload::Drive(b)) if self.kind.is_drive() => {
                    a.sort_key().cmp(&b.sort_key())
                }
                _ => Ordering::Equal,
            })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// DEFAULT PRIORITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Per-kind priorities used when a driver has no boot order match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPriorities {
    pub floppy: Priority,
    pub cdrom: Priority,
    pub hard_disk: Priority,
    /// Consumed by the first BEV registration
    pub bev: Priority,
}

impl Default for DefaultPriorities {
    fn default() -> Self {
        Self {
            floppy: 101,
            cdrom: 102,
            hard_disk: 103,
            bev: 104,
        }
    }
}

impl DefaultPriorities {
    /// Decode the emulator NVRAM boot device order.
    ///
    /// Three 4-bit device codes (1 floppy, 2 hard disk, 3 CD-ROM, 4 BEV):
    /// the low and high nibbles of `flag2`, then the high nibble of `flag1`.
    /// They take priorities 101, 102, 103; unlisted kinds get the default.
    pub fn from_cmos_bootflags(flag1: u8, flag2: u8) -> Self {
        let mut order = flag2 as u32 | ((flag1 as u32 & 0xf0) << 4);
        let mut prios = Self {
            floppy: DEFAULT_PRIO,
            cdrom: DEFAULT_PRIO,
            hard_disk: DEFAULT_PRIO,
            bev: DEFAULT_PRIO,
        };

        for prio in 101..104 {
            match order & 0x0f {
                1 => prios.floppy = prio,
                2 => prios.hard_disk = prio,
                3 => prios.cdrom = prio,
                4 => prios.bev = prio,
                _ => {}
            }
            order >>= 4;
        }
        prios
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════

/// Sorted list of boot candidates
#[derive(Debug, Clone, Default)]
pub struct BootRegistry {
    list: Vec<BootCandidate>,
    defaults: DefaultPriorities,
}

impl BootRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: DefaultPriorities) -> Self {
        Self {
            list: Vec::new(),
            defaults,
        }
    }

    pub fn defaults(&self) -> &DefaultPriorities {
        &self.defaults
    }

    /// Insert keeping the list sorted. On allocation failure the candidate
    /// is dropped with a warning.
    pub fn register(&mut self, candidate: BootCandidate) -> Result<()> {
        if self.list.try_reserve(1).is_err() {
            log::warn!("WARNING - Unable to allocate resource for {}", candidate.description);
            return Err(BootError::AllocationFailure);
        }

        log::debug!(
            "Registering bootable: {} (type:{} prio:{} data:{:?})",
            candidate.description,
            candidate.kind.code(),
            candidate.priority,
            candidate.payload
        );

        let pos = self
            .list
            .iter()
            .position(|pos| candidate.order(pos) == Ordering::Less)
            .unwrap_or(self.list.len());
        self.list.insert(pos, candidate);
        Ok(())
    }

    fn add(
        &mut self,
        kind: BootKind,
        prio: Option<Priority>,
        default: Priority,
        payload: Payload,
        desc: Option<&str>,
    ) -> Result<()> {
        let priority = prio.unwrap_or(default);
        self.register(BootCandidate::new(kind, priority, payload, desc.unwrap_or("?")))
    }

    pub fn add_floppy(&mut self, drive: DriveRef, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        let default = self.defaults.floppy;
        self.add(BootKind::Floppy, prio, default, Payload::Drive(drive), desc)
    }

    pub fn add_hd(&mut self, drive: DriveRef, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        let default = self.defaults.hard_disk;
        self.add(BootKind::HardDisk, prio, default, Payload::Drive(drive), desc)
    }

    pub fn add_cd(&mut self, drive: DriveRef, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        let default = self.defaults.cdrom;
        self.add(BootKind::CdRom, prio, default, Payload::Drive(drive), desc)
    }

    pub fn add_cbfs(&mut self, file: PayloadRef, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        self.add(BootKind::Cbfs, prio, DEFAULT_PRIO, Payload::File(file), desc)
    }

    /// Option ROM boot execution vector. The BEV default priority is
    /// spent by this call whether or not it was used.
    pub fn add_bev(&mut self, vector: SegOff, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        let default = self.defaults.bev;
        let res = self.add(
            BootKind::Bev,
            prio,
            default,
            Payload::Vector(vector),
            Some(desc.unwrap_or("Unknown")),
        );
        self.defaults.bev = DEFAULT_PRIO;
        res
    }

    /// Expansion card boot connection vector; sorts with hard disks by default
    pub fn add_bcv(&mut self, vector: SegOff, desc: Option<&str>, prio: Option<Priority>) -> Result<()> {
        let default = self.defaults.hard_disk;
        self.add(
            BootKind::Bcv,
            prio,
            default,
            Payload::Vector(vector),
            Some(desc.unwrap_or("Legacy option rom")),
        )
    }

    /// Stop marker registered at the rank of the `HALT` boot order line
    pub fn add_halt(&mut self, prio: Priority) -> Result<()> {
        self.register(BootCandidate::new(BootKind::Halt, prio, Payload::None, "HALT"))
    }

    /// Move the `choice`-th candidate (1-based) to the front with priority 0.
    /// Returns the promoted candidate; 0 and out-of-range choices do nothing.
    pub fn select_and_promote(&mut self, choice: usize) -> Option<&BootCandidate> {
        if choice == 0 || choice > self.list.len() {
            return None;
        }
        let mut candidate = self.list.remove(choice - 1);
        candidate.priority = 0;
        self.list.insert(0, candidate);
        self.list.first()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, BootCandidate> {
        self.list.iter()
    }

    pub fn get(&self, index: usize) -> Option<&BootCandidate> {
        self.list.get(index)
    }

    pub fn first(&self) -> Option<&BootCandidate> {
        self.list.first()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<'a> IntoIterator for &'a BootRegistry {
    type Item = &'a BootCandidate;
    type IntoIter = core::slice::Iter<'a, BootCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
