//! Common test utilities: a scripted board implementing every collaborator

#![allow(dead_code)]

use std::collections::VecDeque;

use morpheus_bootcore::regs::{
    REG_BIOS_BOOT_COUNT, REG_BIOS_BOOT_SOURCE, REG_BIOS_LAST_STAGE, REG_RESET_CAUSE,
};
use morpheus_bootcore::{
    BootAttempts, Clock, Console, DriveMapper, DriveRef, KeySource, Machine, PayloadRef,
    RegisterStore, SegOff,
};

/// Simulated time after which an idle loop is considered stuck
const RUNAWAY_MS: u64 = 24 * 60 * 60 * 1000;

/// One recorded boot attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Floppy { check_signature: bool },
    HardDisk(u32),
    CdRom(DriveRef),
    Cbfs(PayloadRef),
    Rom(SegOff),
}

/// Board double: register file, scripted keys on a millisecond clock,
/// captured console output, and recorded mapping/boot/machine calls.
#[derive(Debug, Default)]
pub struct MockBoard {
    pub regs: Vec<u8>,
    pub now: u64,
    /// (visible at ms, scan code)
    pub keys: VecDeque<(u64, u8)>,
    pub output: String,
    pub status: Option<String>,
    pub splash: Option<String>,
    pub splash_active: bool,
    /// Renderer without a splash image: enable_splash leaves it inactive
    pub no_splash: bool,
    pub paused: bool,
    pub clears: usize,
    pub platform_info: usize,
    pub input_waits: usize,

    pub next_hd_id: u32,
    pub mapped_floppies: Vec<DriveRef>,
    pub mapped_disks: Vec<DriveRef>,
    pub mapped_cdroms: Vec<DriveRef>,
    pub bcv_calls: Vec<SegOff>,

    pub attempts: Vec<Attempt>,
    pub post_codes: Vec<u8>,
    pub resets: usize,
    pub halts: usize,
    /// Register writes in order
    pub writes: Vec<(u16, u8)>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            regs: vec![0; 0x20],
            ..Default::default()
        }
    }

    pub fn with_keys(mut self, keys: &[(u64, u8)]) -> Self {
        self.keys = keys.iter().copied().collect();
        self
    }

    pub fn without_splash(mut self) -> Self {
        self.no_splash = true;
        self
    }

    /// Preload the state a previous boot left behind
    pub fn with_recovery(mut self, cause: u8, last_stage: u8, boot_source: u8, boot_count: u8) -> Self {
        self.regs[REG_RESET_CAUSE as usize] = cause;
        self.regs[REG_BIOS_LAST_STAGE as usize] = last_stage;
        self.regs[REG_BIOS_BOOT_SOURCE as usize] = boot_source;
        self.regs[REG_BIOS_BOOT_COUNT as usize] = boot_count;
        self
    }

    pub fn reg(&self, reg: u16) -> u8 {
        self.regs[reg as usize]
    }

    pub fn set_reg(&mut self, reg: u16, val: u8) {
        self.regs[reg as usize] = val;
    }

    /// Every value written to `reg`, oldest first
    pub fn writes_to(&self, reg: u16) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(r, _)| *r == reg)
            .map(|(_, v)| *v)
            .collect()
    }
}

impl RegisterStore for MockBoard {
    fn read_u8(&mut self, reg: u16) -> u8 {
        self.regs.get(reg as usize).copied().unwrap_or(0xff)
    }

    fn write_u8(&mut self, reg: u16, val: u8) {
        self.writes.push((reg, val));
        if let Some(slot) = self.regs.get_mut(reg as usize) {
            *slot = val;
        }
    }
}

impl KeySource for MockBoard {
    fn poll_key(&mut self) -> Option<u8> {
        match self.keys.front() {
            Some(&(at, scan)) if at <= self.now => {
                self.keys.pop_front();
                Some(scan)
            }
            _ => None,
        }
    }
}

impl Clock for MockBoard {
    fn now_ms(&self) -> u64 {
        self.now
    }

    fn idle(&mut self, budget_ms: Option<u32>) {
        self.now += budget_ms.map_or(10, |b| b.clamp(1, 10) as u64);
        assert!(self.now < RUNAWAY_MS, "idle loop never finished");
    }
}

impl Console for MockBoard {
    fn print(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn status(&mut self, text: &str) {
        self.status = Some(text.to_string());
    }

    fn clear(&mut self) {
        self.clears += 1;
    }

    fn enable_splash(&mut self, menukey_text: &str) {
        self.splash = Some(menukey_text.to_string());
        self.splash_active = !self.no_splash;
    }

    fn disable_splash(&mut self) {
        self.splash_active = false;
    }

    fn splash_active(&self) -> bool {
        self.splash_active
    }

    fn show_paused(&mut self) {
        self.paused = true;
    }

    fn begin_input_wait(&mut self) {
        self.input_waits += 1;
    }

    fn print_platform_info(&mut self) {
        self.platform_info += 1;
    }
}

impl DriveMapper for MockBoard {
    fn map_floppy(&mut self, drive: &DriveRef) {
        self.mapped_floppies.push(*drive);
    }

    fn map_hard_disk(&mut self, drive: &DriveRef) -> u32 {
        self.mapped_disks.push(*drive);
        let id = self.next_hd_id;
        self.next_hd_id += 1;
        id
    }

    fn map_cdrom(&mut self, drive: &DriveRef) {
        self.mapped_cdroms.push(*drive);
    }

    fn call_bcv(&mut self, vector: SegOff) {
        self.bcv_calls.push(vector);
    }
}

impl BootAttempts for MockBoard {
    fn boot_floppy(&mut self, check_signature: bool) {
        self.attempts.push(Attempt::Floppy { check_signature });
    }

    fn boot_hard_disk(&mut self, drive_id: u32) {
        self.attempts.push(Attempt::HardDisk(drive_id));
    }

    fn boot_cdrom(&mut self, drive: &DriveRef) {
        self.attempts.push(Attempt::CdRom(*drive));
    }

    fn boot_cbfs(&mut self, file: PayloadRef) {
        self.attempts.push(Attempt::Cbfs(file));
    }

    fn boot_rom(&mut self, vector: SegOff) {
        self.attempts.push(Attempt::Rom(vector));
    }
}

impl Machine for MockBoard {
    fn post_code(&mut self, code: u8) {
        self.post_codes.push(code);
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn halt(&mut self) {
        self.halts += 1;
    }
}

/// Disk drive with a distinct handle
pub fn disk(handle: u32) -> DriveRef {
    DriveRef::new(handle, 0x20, handle)
}
