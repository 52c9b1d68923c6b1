//! Machine control: POST codes, platform reset, halt

use morpheus_bootcore::Machine;

use crate::pio::PortIo;

pub const POST_PORT: u16 = 0x80;
pub const RESET_CONTROL_PORT: u16 = 0xCF9;
pub const KBC_COMMAND_PORT: u16 = 0x64;

const RST_CPU: u8 = 0x02;
const SYS_RST: u8 = 0x04;
const KBC_PULSE_RESET: u8 = 0xFE;

pub struct X86Machine<P: PortIo> {
    io: P,
}

impl<P: PortIo> X86Machine<P> {
    pub const fn new(io: P) -> Self {
        Self { io }
    }
}

impl<P: PortIo> Machine for X86Machine<P> {
    fn post_code(&mut self, code: u8) {
        self.io.outb(POST_PORT, code);
    }

    /// Hard reset through the reset control register, then the keyboard
    /// controller if the chipset ignored it.
    fn reset(&mut self) {
        log::info!("Attempting a hard reboot");
        self.io.outb(RESET_CONTROL_PORT, RST_CPU);
        self.io.outb(RESET_CONTROL_PORT, SYS_RST | RST_CPU);
        for _ in 0..1000 {
            core::hint::spin_loop();
        }
        log::warn!("Reset control ignored, pulsing KBC reset line");
        self.io.outb(KBC_COMMAND_PORT, KBC_PULSE_RESET);
    }

    fn halt(&mut self) {
        log::info!("Halting");
        park();
    }
}

#[cfg(all(target_arch = "x86_64", target_os = "none"))]
fn park() -> ! {
    loop {
        unsafe { core::arch::asm!("sti", "hlt", options(nomem, nostack)) };
    }
}

/// Hosted builds have nothing to park; the caller sees a return.
#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
fn park() {}
