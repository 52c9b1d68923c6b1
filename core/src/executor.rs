//! Boot executor
//!
//! Attempts BEV entries one at a time. A successful attempt never comes
//! back; a returning attempt is a failure and the platform re-enters
//! through "advance after failure" with the cursor bumped. The cursor in
//! `BootCycleState` is the only state carried between entries.

use alloc::format;

use crate::bev::{BevEntry, BevList};
use crate::config::{BootConfig, RetryPolicy};
use crate::error::BootError;
use crate::menu::input::Deadline;
use crate::platform::BootPlatform;
use crate::regs::{self, stage, LED_GREEN_BLINK, LED_RATE_2_HZ, REG_STATUS_LED_DUTY, REG_STATUS_LED_RATE};

/// POST codes on the diagnostic port
pub mod post {
    pub const ATTEMPT_BEGIN: u8 = 0xeb;
    pub const ATTEMPT_END: u8 = 0xec;
    pub const ADVANCE: u8 = 0xee;
    pub const BOOT_FAIL: u8 = 0xef;
}

/// Persisted position in the BEV list for the current boot cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootCycleState {
    /// Index of the entry being attempted
    pub cursor: usize,
}

impl BootCycleState {
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }
}

pub struct BootExecutor<'a> {
    list: &'a BevList,
    retry: RetryPolicy,
    check_floppy_sig: bool,
}

impl<'a> BootExecutor<'a> {
    pub fn new(list: &'a BevList, config: &BootConfig) -> Self {
        Self {
            list,
            retry: config.retry,
            check_floppy_sig: config.check_floppy_sig,
        }
    }

    /// Attempt entry `seq`. Returns only if the attempt did not hand off:
    /// `DispatchFailure` for a returning boot call, `ExhaustedSequence`
    /// once the list is used up (after the BootFail path ran).
    pub fn run<P: BootPlatform + ?Sized>(&self, io: &mut P, seq: usize) -> BootError {
        let Some(entry) = self.list.get(seq) else {
            return self.boot_fail(io);
        };

        io.post_code(post::ATTEMPT_BEGIN);
        io.post_code(seq as u8);
        io.post_code(entry.kind().code());
        io.post_code(post::ATTEMPT_END);

        regs::write_stage(io, stage::SB_PAYLOAD);
        log::info!("boot: entry {} ({})", seq, entry.kind().as_str());

        match *entry {
            BevEntry::Floppy => {
                io.print("Booting from Floppy...\n");
                io.boot_floppy(self.check_floppy_sig);
            }
            BevEntry::HardDisk { drive_id } => {
                io.print("Booting from Hard Disk...\n");
                io.boot_hard_disk(drive_id);
            }
            BevEntry::CdRom(drive) => {
                io.print("Booting from DVD/CD...\n");
                io.boot_cdrom(&drive);
            }
            BevEntry::Cbfs(file) => {
                io.print("Booting from CBFS...\n");
                io.boot_cbfs(file);
            }
            BevEntry::Rom(vector) => {
                io.print("Booting from ROM...\n");
                io.boot_rom(vector);
            }
            BevEntry::Halt => return self.boot_fail(io),
        }

        log::warn!("boot: entry {} returned", seq);
        BootError::DispatchFailure
    }

    /// Fresh boot cycle: restore the status LED, rewind the cursor, try entry 0.
    pub fn start_cycle<P: BootPlatform + ?Sized>(
        &self,
        io: &mut P,
        state: &mut BootCycleState,
    ) -> BootError {
        io.write_u8(REG_STATUS_LED_DUTY, LED_GREEN_BLINK);
        io.write_u8(REG_STATUS_LED_RATE, LED_RATE_2_HZ);

        state.cursor = 0;
        self.run(io, 0)
    }

    /// Re-entry after a failed attempt: try the next entry.
    pub fn advance_after_failure<P: BootPlatform + ?Sized>(
        &self,
        io: &mut P,
        state: &mut BootCycleState,
    ) -> BootError {
        io.post_code(post::ADVANCE);
        state.cursor += 1;
        self.run(io, state.cursor)
    }

    /// Firmware loop: start a cycle and keep advancing until an attempt
    /// hands off or the list is exhausted.
    pub fn run_until_handoff<P: BootPlatform + ?Sized>(
        &self,
        io: &mut P,
        state: &mut BootCycleState,
    ) -> BootError {
        let mut err = self.start_cycle(io, state);
        while err.is_retryable() {
            err = self.advance_after_failure(io, state);
        }
        err
    }

    /// Nothing left to boot: tell the operator, wait, then restart.
    fn boot_fail<P: BootPlatform + ?Sized>(&self, io: &mut P) -> BootError {
        io.post_code(post::BOOT_FAIL);
        log::warn!("{}", BootError::ExhaustedSequence);

        match self.retry {
            RetryPolicy::Never => {
                io.print("No bootable device.\n");
                io.halt();
            }
            RetryPolicy::After(ms) => {
                io.print(&format!(
                    "No bootable device.  Retrying in {} seconds.\n",
                    ms / 1000
                ));
                let deadline = Deadline::after(&*io, ms);
                while !deadline.expired(&*io) {
                    let left = deadline.remaining(&*io);
                    io.idle(Some(left));
                }
                io.print("Rebooting.\n");
                io.reset();
            }
        }
        BootError::ExhaustedSequence
    }
}
