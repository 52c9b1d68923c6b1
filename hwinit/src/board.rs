//! CPU-1900 board platform
//!
//! Bundles the FPGA register window, the COM1 console and keyboard, the
//! BDA timer and machine control into one value the boot menu can run on.

use alloc::format;

use morpheus_bootcore::regs::{ResetCause, REG_RESET_CAUSE};
use morpheus_bootcore::{Clock, Console, KeySource, Machine, RegisterStore};

use crate::fpga::FpgaRegisters;
use crate::machine::X86Machine;
use crate::pio::PortIo;
use crate::serial::{Serial, SerialConsole, SerialKeys, COM1};

pub struct Cpu1900Board<P: PortIo, C: Clock> {
    io: P,
    clock: C,
}

impl<P: PortIo, C: Clock> Cpu1900Board<P, C> {
    pub fn new(io: P, clock: C) -> Self {
        Self { io, clock }
    }

    /// Replay the tail of the boot log on the console, e.g. before a
    /// BootFail restart.
    pub fn dump_log(&mut self, n: usize) {
        Serial::new(&mut self.io, COM1).dump_log(n)
    }

    fn fpga(&mut self) -> FpgaRegisters<&mut P> {
        FpgaRegisters::new(&mut self.io)
    }

    fn console(&mut self) -> SerialConsole<&mut P> {
        SerialConsole::new(Serial::new(&mut self.io, COM1))
    }

    fn machine(&mut self) -> X86Machine<&mut P> {
        X86Machine::new(&mut self.io)
    }
}

impl<P: PortIo, C: Clock> RegisterStore for Cpu1900Board<P, C> {
    fn read_u8(&mut self, reg: u16) -> u8 {
        self.fpga().read_u8(reg)
    }

    fn write_u8(&mut self, reg: u16, val: u8) {
        self.fpga().write_u8(reg, val)
    }
}

impl<P: PortIo, C: Clock> KeySource for Cpu1900Board<P, C> {
    fn poll_key(&mut self) -> Option<u8> {
        SerialKeys::new(Serial::new(&mut self.io, COM1)).poll_key()
    }
}

impl<P: PortIo, C: Clock> Clock for Cpu1900Board<P, C> {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn idle(&mut self, budget_ms: Option<u32>) {
        self.clock.idle(budget_ms)
    }
}

impl<P: PortIo, C: Clock> Console for Cpu1900Board<P, C> {
    fn print(&mut self, text: &str) {
        self.console().print(text)
    }

    fn status(&mut self, text: &str) {
        self.console().status(text)
    }

    fn clear(&mut self) {
        self.console().clear()
    }

    fn enable_splash(&mut self, menukey_text: &str) {
        self.console().enable_splash(menukey_text)
    }

    fn disable_splash(&mut self) {
        self.console().disable_splash()
    }

    fn splash_active(&self) -> bool {
        false
    }

    fn show_paused(&mut self) {
        self.console().show_paused()
    }

    fn print_platform_info(&mut self) {
        let cause = ResetCause::from_raw(self.read_u8(REG_RESET_CAUSE));
        self.print(&format!("CPU1900: last reset {}\n", cause.as_str()));
    }
}

impl<P: PortIo, C: Clock> Machine for Cpu1900Board<P, C> {
    fn post_code(&mut self, code: u8) {
        self.machine().post_code(code)
    }

    fn reset(&mut self) {
        self.machine().reset()
    }

    fn halt(&mut self) {
        self.machine().halt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpga::FPGA_REG_BASE;
    use crate::pio::fake::FakePorts;
    use alloc::string::String;
    use core::cell::Cell;
    use morpheus_bootcore::menu::recovery::RecoveryRule;
    use morpheus_bootcore::regs::{
        REG_BIOS_BOOT_COUNT, REG_BIOS_BOOT_SOURCE, REG_BIOS_LAST_STAGE, REG_FPGA_OPTIONS,
    };
    use morpheus_bootcore::{BootConfig, BootRegistry, DriveRef, InteractiveMenu};

    #[derive(Default)]
    struct StepClock {
        now: Cell<u64>,
    }

    impl Clock for StepClock {
        fn now_ms(&self) -> u64 {
            self.now.get()
        }

        fn idle(&mut self, _budget_ms: Option<u32>) {
            self.now.set(self.now.get() + 10);
        }
    }

    const LSR: u16 = COM1 + 5;

    fn fpga(reg: u16) -> u16 {
        FPGA_REG_BASE + reg
    }

    fn serial_text(ports: &FakePorts) -> String {
        String::from_utf8(ports.writes_to(COM1)).unwrap_or_default()
    }

    #[test]
    fn test_headless_recovery_advances_entry() {
        let mut ports = FakePorts::default();
        ports.values.insert(LSR, 0x20);
        ports.values.insert(fpga(REG_FPGA_OPTIONS), 0x10);
        ports.values.insert(fpga(REG_RESET_CAUSE), 0x01);
        ports.values.insert(fpga(REG_BIOS_LAST_STAGE), 0x1f);
        ports.values.insert(fpga(REG_BIOS_BOOT_SOURCE), 0x21);
        ports.values.insert(fpga(REG_BIOS_BOOT_COUNT), 0x03);

        let mut registry = BootRegistry::new();
        registry
            .add_hd(DriveRef::new(1, 0x20, 0), Some("AHCI/0: Delkin Devices"), Some(1))
            .unwrap();
        registry
            .add_hd(DriveRef::new(2, 0x10, 0), Some("USB MSC Drive Verbatim"), Some(2))
            .unwrap();

        let config = BootConfig::default();
        let mut board = Cpu1900Board::new(&mut ports, StepClock::default());
        let outcome = InteractiveMenu::new(&config).run(&mut board, &mut registry);

        assert_eq!(outcome.selection, 2);
        assert_eq!(outcome.rule, Some(RecoveryRule::Failed));
        assert_eq!(registry.first().map(|c| c.description.as_str()), Some("USB MSC Drive Verbatim"));

        assert_eq!(ports.values[&fpga(REG_BIOS_BOOT_SOURCE)], 0x12);
        // failure counter left for the reset handler
        assert_eq!(ports.values[&fpga(REG_BIOS_BOOT_COUNT)], 0x03);

        let text = serial_text(&ports);
        assert!(text.contains("RECOVERY: FAIL, booting 2"));
        assert!(text.contains("CPU1900: last reset Watchdog"));
    }

    #[test]
    fn test_dump_log_replays_ring() {
        morpheus_bootcore::logger::init(log::LevelFilter::Info);
        log::info!("board replay check {}", 7);

        let mut ports = FakePorts::default();
        ports.values.insert(LSR, 0x20);
        let mut board = Cpu1900Board::new(&mut ports, StepClock::default());
        board.dump_log(morpheus_bootcore::logger::MAX_LOG_ENTRIES);

        assert!(serial_text(&ports).contains("[BOOT] board replay check 7\n"));
    }
}
