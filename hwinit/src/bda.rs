//! BIOS Data Area timer
//!
//! The PIT interrupt bumps a 32-bit tick counter at 0x46C about 18.2 times
//! a second and wraps it at midnight. `BdaClock` turns that into a
//! monotonic millisecond clock.

use core::cell::Cell;
use core::ptr;

use morpheus_bootcore::Clock;

/// Physical address of the BDA tick counter
pub const BDA_TICKS_ADDR: usize = 0x46C;

/// Ticks per day; the counter wraps to zero at this value
pub const TICKS_PER_DAY: u32 = 0x1800B0;

const PIT_HZ: u64 = 1_193_180;

pub const fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 65536 * 1000 / PIT_HZ
}

pub struct BdaClock {
    counter: *const u32,
    last: Cell<u32>,
    /// Ticks accumulated across midnight wraps
    total: Cell<u64>,
}

impl BdaClock {
    /// # Safety
    /// `counter` must stay readable for the life of the clock and be
    /// updated by the timer interrupt.
    pub unsafe fn at(counter: *const u32) -> Self {
        let now = ptr::read_volatile(counter);
        Self {
            counter,
            last: Cell::new(now),
            total: Cell::new(now as u64),
        }
    }

    /// # Safety
    /// Identity-mapped real-mode memory with the BDA at its fixed address.
    pub unsafe fn bios() -> Self {
        Self::at(BDA_TICKS_ADDR as *const u32)
    }

    pub fn ticks(&self) -> u64 {
        let now = unsafe { ptr::read_volatile(self.counter) };
        let last = self.last.get();
        let elapsed = if now >= last {
            now - last
        } else {
            TICKS_PER_DAY.wrapping_sub(last).wrapping_add(now)
        };
        self.last.set(now);
        self.total.set(self.total.get() + elapsed as u64);
        self.total.get()
    }
}

impl Clock for BdaClock {
    fn now_ms(&self) -> u64 {
        ticks_to_ms(self.ticks())
    }

    /// Ticks only advance from the timer interrupt, so open an interrupt
    /// window even if the caller runs with IF clear.
    fn idle(&mut self, _budget_ms: Option<u32>) {
        yield_irqs();
    }
}

/// Let pending interrupts run, then restore the caller's IF.
#[cfg(all(target_arch = "x86_64", target_os = "none"))]
fn yield_irqs() {
    unsafe {
        core::arch::asm!("pushfq", "sti", "nop", "popfq");
    }
}

#[cfg(not(all(target_arch = "x86_64", target_os = "none")))]
fn yield_irqs() {
    core::hint::spin_loop();
}
