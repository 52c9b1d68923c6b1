//! x86 port I/O
//!
//! Everything in this crate reaches hardware through `PortIo` so the
//! register logic can be exercised against a fake port space.

/// Byte-wide I/O port access
pub trait PortIo {
    fn inb(&mut self, port: u16) -> u8;
    fn outb(&mut self, port: u16, val: u8);
}

/// Real I/O ports via `in`/`out` instructions.
///
/// On targets without port I/O reads float high and writes are dropped.
#[derive(Debug, Clone, Copy)]
pub struct X86Ports {
    _private: (),
}

impl X86Ports {
    /// # Safety
    /// Caller must run at an I/O privilege level that allows port access
    /// and must own the ports it touches.
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl PortIo for X86Ports {
    #[inline]
    fn inb(&mut self, port: u16) -> u8 {
        let val: u8;
        unsafe {
            core::arch::asm!(
                "in al, dx",
                in("dx") port,
                out("al") val,
                options(nomem, nostack, preserves_flags)
            );
        }
        val
    }

    #[inline]
    fn outb(&mut self, port: u16, val: u8) {
        unsafe {
            core::arch::asm!(
                "out dx, al",
                in("dx") port,
                in("al") val,
                options(nomem, nostack, preserves_flags)
            );
        }
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
impl PortIo for X86Ports {
    fn inb(&mut self, _port: u16) -> u8 {
        0xff
    }

    fn outb(&mut self, _port: u16, _val: u8) {}
}

impl<T: PortIo + ?Sized> PortIo for &mut T {
    fn inb(&mut self, port: u16) -> u8 {
        (**self).inb(port)
    }

    fn outb(&mut self, port: u16, val: u8) {
        (**self).outb(port, val)
    }
}
