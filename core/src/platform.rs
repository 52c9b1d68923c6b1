//! Collaborator interfaces
//!
//! The boot core never touches hardware directly. Everything it needs from
//! the board is reached through these traits so the firmware can plug in
//! port I/O while tests plug in a scripted double.

use crate::candidate::{DriveRef, PayloadRef, SegOff};

/// Byte-addressable diagnostic/config register store.
///
/// Accesses are not atomic across a read and a later write; an external
/// reset may land in between.
pub trait RegisterStore {
    fn read_u8(&mut self, reg: u16) -> u8;
    fn write_u8(&mut self, reg: u16, val: u8);
}

/// Raw keystroke source.
pub trait KeySource {
    /// Next pending scan code, without blocking.
    fn poll_key(&mut self) -> Option<u8>;
}

/// Tick-derived time base.
pub trait Clock {
    /// Milliseconds since an arbitrary epoch, monotonic within a boot
    fn now_ms(&self) -> u64;

    /// Yield to pending interrupts. `budget_ms` is how long the caller is
    /// still willing to wait (`None` = indefinitely); implementations may
    /// return early.
    fn idle(&mut self, budget_ms: Option<u32>);
}

/// Text/splash output.
pub trait Console {
    /// Append text to the boot console
    fn print(&mut self, text: &str);

    /// Replace the status line
    fn status(&mut self, text: &str);

    fn clear(&mut self);

    /// Show the splash with a "press <key>" prompt
    fn enable_splash(&mut self, menukey_text: &str);

    fn disable_splash(&mut self);

    fn splash_active(&self) -> bool;

    /// Freeze the splash; the next key reboots
    fn show_paused(&mut self);

    /// Input wait is about to start (renderer may animate meanwhile)
    fn begin_input_wait(&mut self) {}

    fn end_input_wait(&mut self) {}

    /// Board summary printed when the menu is skipped
    fn print_platform_info(&mut self) {}
}

/// Per-candidate device mapping performed while flattening.
pub trait DriveMapper {
    fn map_floppy(&mut self, drive: &DriveRef);

    /// Map a disk to a runtime drive id
    fn map_hard_disk(&mut self, drive: &DriveRef) -> u32;

    fn map_cdrom(&mut self, drive: &DriveRef);

    /// Run an expansion ROM's boot connection vector
    fn call_bcv(&mut self, vector: SegOff);
}

/// Boot attempts, one per BEV kind.
///
/// On success control never comes back. Returning means the attempt failed.
pub trait BootAttempts {
    fn boot_floppy(&mut self, check_signature: bool);
    fn boot_hard_disk(&mut self, drive_id: u32);
    fn boot_cdrom(&mut self, drive: &DriveRef);
    fn boot_cbfs(&mut self, file: PayloadRef);
    fn boot_rom(&mut self, vector: SegOff);
}

/// Machine-level control.
pub trait Machine {
    /// Progress code on the diagnostic port
    fn post_code(&mut self, _code: u8) {}

    /// Hard platform restart. Does not return on real hardware.
    fn reset(&mut self);

    /// Park the CPU, servicing interrupts. Does not return on real hardware.
    fn halt(&mut self);
}

/// Everything the interactive menu touches
pub trait MenuPlatform: RegisterStore + KeySource + Clock + Console + Machine {}

impl<T> MenuPlatform for T where T: RegisterStore + KeySource + Clock + Console + Machine + ?Sized {}

/// Everything the boot executor touches
pub trait BootPlatform: RegisterStore + Clock + Console + Machine + BootAttempts {}

impl<T> BootPlatform for T where T: RegisterStore + Clock + Console + Machine + BootAttempts + ?Sized {}
