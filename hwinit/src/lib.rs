//! Hardware layer for the boot core
//!
//! Implements the `morpheus-bootcore` platform traits for the CPU-1900
//! board: the FPGA diagnostic register window, COM1 as console and
//! keyboard, the BDA tick counter as clock, and POST/reset/halt.
//!
//! # Architecture
//!
//! ```text
//!   InteractiveMenu / BootExecutor
//!              │ (platform traits)
//!        Cpu1900Board<P, C>
//!     ┌──────┬──────┴────┬─────────┐
//!   fpga   serial     machine    bda
//!     └──────┴───────────┘
//!           PortIo (in/out)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use morpheus_hwinit::{BdaClock, Cpu1900Board, X86Ports};
//!
//! let mut board = unsafe { Cpu1900Board::new(X86Ports::new(), BdaClock::bios()) };
//! let outcome = InteractiveMenu::new(&config).run(&mut board, &mut registry);
//! ```

#![no_std]

extern crate alloc;

pub mod bda;
pub mod board;
pub mod fpga;
pub mod machine;
pub mod pio;
pub mod serial;

// ═══════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════

pub use bda::BdaClock;
pub use board::Cpu1900Board;
pub use fpga::{FpgaRegisters, FPGA_REG_BASE, FPGA_REG_SIZE};
pub use machine::X86Machine;
pub use pio::{PortIo, X86Ports};
pub use serial::{Serial, SerialConsole, SerialKeys, COM1};
