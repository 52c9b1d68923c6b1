//! Serial console (COM1 @ 0x3F8)
//!
//! No buffering, no interrupts, pure polling. Output gives up on a byte
//! after a bounded spin so a disconnected UART never stalls the boot.

use morpheus_bootcore::menu::keys::{RAWKEY_1, RAWKEY_ENTER};
use morpheus_bootcore::{Console, KeySource};
use crate::pio::PortIo;

pub const COM1: u16 = 0x3F8;
const LSR_OFFSET: u16 = 5;
const LSR_DATA_READY: u8 = 0x01;
const LSR_TX_EMPTY: u8 = 0x20;
const TX_SPINS: usize = 100;

pub struct Serial<P: PortIo> {
    io: P,
    base: u16,
}

impl<P: PortIo> Serial<P> {
    pub const fn new(io: P, base: u16) -> Self {
        Self { io, base }
    }

    /// Write one byte. Bounded wait, gives up after ~100 spins.
    pub fn putc(&mut self, b: u8) {
        for _ in 0..TX_SPINS {
            if self.io.inb(self.base + LSR_OFFSET) & LSR_TX_EMPTY != 0 {
                self.io.outb(self.base, b);
                return;
            }
            core::hint::spin_loop();
        }
    }

    pub fn puts(&mut self, s: &str) {
        for b in s.bytes() {
            self.putc(b);
        }
    }

    /// Replay the last `n` boot log lines, oldest first.
    pub fn dump_log(&mut self, n: usize) {
        morpheus_bootcore::logger::last_n(n, |line| {
            self.puts("[BOOT] ");
            self.puts(line);
            self.putc(b'\n');
        });
    }

    /// Received byte, if one is waiting
    pub fn getc(&mut self) -> Option<u8> {
        if self.io.inb(self.base + LSR_OFFSET) & LSR_DATA_READY != 0 {
            Some(self.io.inb(self.base))
        } else {
            None
        }
    }
}

/// Serial terminal keys to raw scan codes: digits and Enter only
pub const fn translate_char(c: u8) -> Option<u8> {
    match c {
        b'1'..=b'9' => Some(RAWKEY_1 + (c - b'1')),
        b'\r' | b'\n' => Some(RAWKEY_ENTER),
        _ => None,
    }
}

/// Boot console on the serial line. The splash has no serial rendering.
pub struct SerialConsole<P: PortIo> {
    port: Serial<P>,
}

impl<P: PortIo> SerialConsole<P> {
    pub const fn new(port: Serial<P>) -> Self {
        Self { port }
    }
}

impl<P: PortIo> Console for SerialConsole<P> {
    fn print(&mut self, text: &str) {
        self.port.puts(text);
    }

    fn status(&mut self, text: &str) {
        self.port.puts(text);
        self.port.putc(b'\n');
    }

    fn clear(&mut self) {
        self.port.putc(b'\n');
    }

    fn enable_splash(&mut self, _menukey_text: &str) {}

    fn disable_splash(&mut self) {}

    fn splash_active(&self) -> bool {
        false
    }

    fn show_paused(&mut self) {}
}

/// Keystrokes typed on the serial terminal
pub struct SerialKeys<P: PortIo> {
    port: Serial<P>,
}

impl<P: PortIo> SerialKeys<P> {
    pub const fn new(port: Serial<P>) -> Self {
        Self { port }
    }
}

impl<P: PortIo> KeySource for SerialKeys<P> {
    /// Untranslatable characters are consumed and dropped
    fn poll_key(&mut self) -> Option<u8> {
        self.port.getc().and_then(translate_char)
    }
}
