//! Morpheus Boot Core
//!
//! Boot device selection and sequencing for legacy-BIOS style firmware:
//! which device to boot, in what order, an optional operator menu, and
//! the attempt loop with fallback when a boot returns.
//!
//! # Architecture
//!
//! ```text
//! drivers ──path──> BootOrder::find_* ──prio──> BootRegistry::add_*
//!                                                     │
//!                               InteractiveMenu::run (may promote one)
//!                                                     │
//!                                      bev::flatten (maps drives)
//!                                                     │
//!                         BootExecutor::start_cycle / advance_after_failure
//!                                                     │
//!                                 BootAttempts::boot_* (never returns on success)
//! ```
//!
//! All hardware access goes through the traits in [`platform`]. The
//! `morpheus-hwinit` crate implements them for the board.
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_bootcore::{BootConfig, BootRegistry, BootExecutor, BootCycleState, InteractiveMenu};
//!
//! let config = BootConfig::load(&fw_cfg);
//! let order = BootConfig::boot_order(&fw_cfg);
//! let mut registry = BootRegistry::with_defaults(config.defaults);
//!
//! // drivers
//! let prio = order.find_ata_device(Some(&ide), 0, 0);
//! registry.add_hd(drive, Some("AHCI/0: Delkin Devices"), prio)?;
//!
//! InteractiveMenu::new(&config).run(&mut board, &mut registry);
//! let list = morpheus_bootcore::bev::flatten(&mut registry, &order, &mut board);
//!
//! let mut cycle = BootCycleState::new();
//! BootExecutor::new(&list, &config).run_until_handoff(&mut board, &mut cycle);
//! ```

#![no_std]

extern crate alloc;

pub mod bev;
pub mod candidate;
pub mod config;
pub mod error;
pub mod executor;
pub mod logger;
pub mod menu;
pub mod order;
pub mod platform;
pub mod regs;

// ═══════════════════════════════════════════════════════════════════════════
// ORDERING RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use order::{BootOrder, PciDevice, Priority, UsbDevice, UsbHub};
pub use candidate::{
    BootCandidate, BootKind, BootRegistry, DefaultPriorities, DriveRef, Payload, PayloadRef, SegOff,
    DEFAULT_PRIO,
};
pub use bev::{BevEntry, BevList, MAX_BEV};

// ═══════════════════════════════════════════════════════════════════════════
// MENU / EXECUTOR RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use menu::{InteractiveMenu, MenuOutcome, MenuState};
pub use executor::{BootCycleState, BootExecutor};

// ═══════════════════════════════════════════════════════════════════════════
// AMBIENT RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{BootConfig, ConfigSource, MapConfig, RetryPolicy};
pub use error::{BootError, Result};
pub use platform::{
    BootAttempts, BootPlatform, Clock, Console, DriveMapper, KeySource, Machine, MenuPlatform,
    RegisterStore,
};
pub use regs::{RecoveryState, ResetCause};
