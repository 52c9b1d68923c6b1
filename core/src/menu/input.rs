//! Keystroke waits
//!
//! Every wait is a polling loop: check for a key, check the deadline,
//! yield to pending interrupts through `Clock::idle`, repeat.

use crate::platform::{Clock, KeySource};

/// How long `get_keystroke` may block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Millis(u32),
    Forever,
}

/// Point in time on the platform clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    end_ms: u64,
}

impl Deadline {
    pub fn after<C: Clock + ?Sized>(clock: &C, ms: u32) -> Self {
        Self {
            end_ms: clock.now_ms() + ms as u64,
        }
    }

    pub fn expired<C: Clock + ?Sized>(&self, clock: &C) -> bool {
        clock.now_ms() >= self.end_ms
    }

    /// Milliseconds left, zero once expired
    pub fn remaining<C: Clock + ?Sized>(&self, clock: &C) -> u32 {
        self.end_ms.saturating_sub(clock.now_ms()).min(u32::MAX as u64) as u32
    }
}

/// Wait for a scan code. `None` on timeout.
pub fn get_keystroke<P: KeySource + Clock + ?Sized>(io: &mut P, timeout: Timeout) -> Option<u8> {
    let deadline = match timeout {
        Timeout::Millis(ms) => Some(Deadline::after(&*io, ms)),
        Timeout::Forever => None,
    };

    loop {
        if let Some(scan) = io.poll_key() {
            return Some(scan);
        }

        let budget = match deadline {
            Some(d) if d.expired(&*io) => return None,
            Some(d) => Some(d.remaining(&*io)),
            None => None,
        };
        io.idle(budget);
    }
}

/// Throw away type-ahead
pub fn drain_keys<P: KeySource + Clock + ?Sized>(io: &mut P) {
    while get_keystroke(io, Timeout::Millis(0)).is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;

    /// Keys become visible at their timestamp; idle advances 10 ms
    struct Scripted {
        now: u64,
        keys: VecDeque<(u64, u8)>,
        idles: Vec<Option<u32>>,
    }

    impl Scripted {
        fn new(keys: &[(u64, u8)]) -> Self {
            Self {
                now: 0,
                keys: keys.iter().copied().collect(),
                idles: Vec::new(),
            }
        }
    }

    impl KeySource for Scripted {
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

    impl Clock for Scripted {
        fn now_ms(&self) -> u64 {
            self.now
        }
        fn idle(&mut self, budget_ms: Option<u32>) {
            self.idles.push(budget_ms);
            self.now += 10;
        }
    }

    #[test]
    fn test_key_before_deadline() {
        let mut io = Scripted::new(&[(30, 0x1c)]);
        assert_eq!(get_keystroke(&mut io, Timeout::Millis(100)), Some(0x1c));
        assert_eq!(io.now, 30);
        assert_eq!(io.idles[0], Some(100));
    }

    #[test]
    fn test_timeout() {
        let mut io = Scripted::new(&[(500, 0x1c)]);
        assert_eq!(get_keystroke(&mut io, Timeout::Millis(100)), None);
        assert_eq!(io.now, 100);
    }

    #[test]
    fn test_zero_timeout_polls_once() {
        let mut io = Scripted::new(&[(0, 0x02), (50, 0x03)]);
        assert_eq!(get_keystroke(&mut io, Timeout::Millis(0)), Some(0x02));
        assert_eq!(get_keystroke(&mut io, Timeout::Millis(0)), None);
        assert!(io.idles.is_empty());
    }

    #[test]
    fn test_forever_waits() {
        let mut io = Scripted::new(&[(10_000, 0x01)]);
        assert_eq!(get_keystroke(&mut io, Timeout::Forever), Some(0x01));
        assert!(io.idles.iter().all(|b| b.is_none()));
    }

    #[test]
    fn test_drain() {
        let mut io = Scripted::new(&[(0, 0x02), (0, 0x03), (20, 0x04)]);
        drain_keys(&mut io);
        assert_eq!(io.keys.len(), 1);
    }
}
