//! Diagnostic register map
//!
//! The board FPGA exposes a small byte-addressable register window that
//! survives resets. The boot core reads the recovery state from it and
//! leaves stage markers and the chosen boot source behind for the next
//! boot (and for the OS).
//!
//! Field masks are written against the register value as read, so or'ing
//! an enum value into a write works directly.

use crate::platform::RegisterStore;

// ═══════════════════════════════════════════════════════════════════════════
// REGISTER OFFSETS
// ═══════════════════════════════════════════════════════════════════════════

pub const REG_FPGA_OPTIONS: u16 = 0x05;
pub const REG_STATUS_LED_RATE: u16 = 0x07;
pub const REG_STATUS_LED_DUTY: u16 = 0x08;
pub const REG_RESET_CAUSE: u16 = 0x0e;
pub const REG_BIOS_BOOT: u16 = 0x17;
pub const REG_BIOS_BOOT_STAGE: u16 = 0x18;
pub const REG_BIOS_LAST_STAGE: u16 = 0x19;
pub const REG_BIOS_BOOT_SOURCE: u16 = 0x1a;
pub const REG_BIOS_BOOT_COUNT: u16 = 0x1b;

// ═══════════════════════════════════════════════════════════════════════════
// FIELDS
// ═══════════════════════════════════════════════════════════════════════════

pub const RESET_CAUSE_MASK: u8 = 0x07;

pub const BIOS_BOOT_HAPPY: u8 = 0x10;

pub const BOOT_SOURCE_IDX: u8 = 0x0f;
pub const BOOT_SOURCE_TYPE: u8 = 0x70;

pub const BOOT_COUNT_TEST_REBOOT: u8 = 0x80;
pub const BOOT_COUNT_TEST_HAPPY: u8 = 0x40;
pub const BOOT_COUNT_TEST_ALIVE: u8 = 0x20;
pub const BOOT_COUNT_TEST_FAILED: u8 = 0x10;
pub const BOOT_COUNT_COUNT: u8 = 0x0f;

/// Debug-enable jumper: menu is only offered when `(options & MSK) == VAL`
pub const DBG_REG: u16 = REG_FPGA_OPTIONS;
pub const DBG_MSK: u8 = 0x10;
pub const DBG_VAL: u8 = 0x00;

pub const LED_GREEN_BLINK: u8 = 0x40;
pub const LED_RATE_2_HZ: u8 = 4;

/// Boot-stage markers written to `REG_BIOS_BOOT_STAGE`
pub mod stage {
    pub const COLDBOOT: u8 = 0x00;
    pub const CB_PAYLOAD: u8 = 0x04;
    pub const SB_SPLASH: u8 = 0x10;
    pub const SB_SPLASH_OFF: u8 = 0x11;
    /// A boot payload was attempted
    pub const SB_PAYLOAD: u8 = 0x1f;
    /// The OS driver took over
    pub const OS_DRIVER: u8 = 0x20;
    pub const APP_HAPPY: u8 = 0x4f;
}

// ═══════════════════════════════════════════════════════════════════════════
// TYPES
// ═══════════════════════════════════════════════════════════════════════════

/// Cause of the last reset as latched by the FPGA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    Cold,
    Watchdog,
    Sleep,
    Power,
    SoftwareReset,
    Other(u8),
}

impl ResetCause {
    pub const fn from_raw(raw: u8) -> Self {
        match raw & RESET_CAUSE_MASK {
            0x00 => Self::Cold,
            0x01 => Self::Watchdog,
            0x02 => Self::Sleep,
            0x03 => Self::Power,
            0x04 => Self::SoftwareReset,
            other => Self::Other(other),
        }
    }

    pub const fn code(&self) -> u8 {
        match self {
            Self::Cold => 0x00,
            Self::Watchdog => 0x01,
            Self::Sleep => 0x02,
            Self::Power => 0x03,
            Self::SoftwareReset => 0x04,
            Self::Other(raw) => *raw,
        }
    }

    /// Resets that can be caused by a payload that failed to come up
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Watchdog | Self::SoftwareReset)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "Cold",
            Self::Watchdog => "Watchdog",
            Self::Sleep => "Sleep",
            Self::Power => "Power",
            Self::SoftwareReset => "Software",
            Self::Other(_) => "Unknown",
        }
    }
}

/// Boot source type field of `REG_BIOS_BOOT_SOURCE`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum BootSourceType {
    None = 0x00,
    Usb = 0x10,
    Sata = 0x20,
    Mmc = 0x30,
    Other = 0x40,
}

impl BootSourceType {
    /// Classify a candidate by the prefix its driver put in the description
    pub fn classify(description: &str) -> Self {
        let prefix = description.as_bytes().get(..4);
        match prefix {
            Some(b"USB ") => Self::Usb,
            Some(b"AHCI") => Self::Sata,
            Some(b"MMC ") => Self::Mmc,
            _ => Self::Other,
        }
    }

    /// Pack type and menu index for the boot-source register.
    /// The index is clamped to 1..=15.
    pub fn encode(self, index: usize) -> u8 {
        let idx = index.clamp(1, BOOT_SOURCE_IDX as usize) as u8;
        self as u8 | idx
    }
}

/// Hardware recovery state left behind by the previous boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryState {
    pub reset_cause: ResetCause,
    /// Last boot-stage marker reached
    pub last_stage: u8,
    /// Raw boot-source register (type | index)
    pub boot_source: u8,
    /// Raw boot-count register (test flags | count)
    pub boot_count: u8,
}

impl RecoveryState {
    pub fn read<R: RegisterStore + ?Sized>(regs: &mut R) -> Self {
        Self {
            reset_cause: ResetCause::from_raw(regs.read_u8(REG_RESET_CAUSE)),
            last_stage: regs.read_u8(REG_BIOS_LAST_STAGE),
            boot_source: regs.read_u8(REG_BIOS_BOOT_SOURCE),
            boot_count: regs.read_u8(REG_BIOS_BOOT_COUNT),
        }
    }

    /// Menu index chosen on the previous boot
    pub const fn last_menu(&self) -> u8 {
        self.boot_source & BOOT_SOURCE_IDX
    }

    /// Consecutive failed boots counted by the reset handler
    pub const fn failure_count(&self) -> u8 {
        self.boot_count & BOOT_COUNT_COUNT
    }
}

/// Clear the failure counter, keeping the test-mode flags.
///
/// Read-then-write: a reset in between leaves the old count in place,
/// which the recovery logic tolerates.
pub fn clear_failure_count<R: RegisterStore + ?Sized>(regs: &mut R) {
    let bbc = regs.read_u8(REG_BIOS_BOOT_COUNT);
    regs.write_u8(REG_BIOS_BOOT_COUNT, bbc & !BOOT_COUNT_COUNT);
}

pub fn write_stage<R: RegisterStore + ?Sized>(regs: &mut R, marker: u8) {
    regs.write_u8(REG_BIOS_BOOT_STAGE, marker);
}

/// Whether the debug-enable jumper is fitted
pub fn debug_enabled<R: RegisterStore + ?Sized>(regs: &mut R) -> bool {
    regs.read_u8(DBG_REG) & DBG_MSK == DBG_VAL
}

/// Tell the FPGA the BIOS came up, unless a test asked us not to.
pub fn mark_bios_happy<R: RegisterStore + ?Sized>(regs: &mut R) {
    let bbc = regs.read_u8(REG_BIOS_BOOT_COUNT);
    if bbc & BOOT_COUNT_TEST_HAPPY != 0 {
        log::info!("CPU1900: TEST Happy");
        return;
    }
    log::info!("CPU1900: Set BIOS Happy bit");
    let boot = regs.read_u8(REG_BIOS_BOOT);
    regs.write_u8(REG_BIOS_BOOT, boot | BIOS_BOOT_HAPPY);
}
