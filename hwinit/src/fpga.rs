//! CPU-1900 FPGA register window
//!
//! 0x200 byte registers at I/O base 0x1100. The boot core's diagnostic
//! register map lives here and survives warm resets.

use morpheus_bootcore::RegisterStore;

use crate::pio::PortIo;

pub const FPGA_REG_BASE: u16 = 0x1100;
pub const FPGA_REG_SIZE: u16 = 0x200;

pub struct FpgaRegisters<P: PortIo> {
    io: P,
}

impl<P: PortIo> FpgaRegisters<P> {
    pub const fn new(io: P) -> Self {
        Self { io }
    }
}

impl<P: PortIo> RegisterStore for FpgaRegisters<P> {
    /// Registers outside the window read as 0xff
    fn read_u8(&mut self, reg: u16) -> u8 {
        if reg < FPGA_REG_SIZE {
            self.io.inb(FPGA_REG_BASE + reg)
        } else {
            0xff
        }
    }

    /// Writes outside the window are dropped
    fn write_u8(&mut self, reg: u16, val: u8) {
        if reg < FPGA_REG_SIZE {
            self.io.outb(FPGA_REG_BASE + reg, val);
        }
    }
}
