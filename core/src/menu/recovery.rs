//! Recovery autoselect
//!
//! Decides which menu entry to boot from what the previous boot left in
//! the diagnostic registers. A payload that keeps resetting the board
//! (software reset or watchdog) after being attempted is skipped once the
//! failure counter reaches `RECOVERY_THRESHOLD`.
//!
//! The counter itself is incremented by the platform reset handler; this
//! code only reads and clears it.

use alloc::format;
use alloc::string::String;

use crate::platform::{Console, RegisterStore};
use crate::regs::{self, stage, RecoveryState};

/// Failed boots in a row before moving on to the next entry
pub const RECOVERY_THRESHOLD: u8 = 3;

/// Which rule picked the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryRule {
    /// The last boot never reached a payload
    NoPayloadAttempt,
    /// The last boot got as far as the OS driver
    OsReached,
    /// Reset was not one a failing payload causes
    NotRecoverable,
    /// Same entry again; not enough failures yet
    Waiting { count: u8 },
    /// Too many failures: next entry
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryDecision {
    /// 1-based menu position; 0 leaves the order untouched
    pub index: usize,
    pub rule: RecoveryRule,
    pub clear_count: bool,
}

impl RecoveryDecision {
    pub fn decide(state: &RecoveryState) -> Self {
        let previous = state.last_menu() as usize;
        let (index, rule) = if state.last_stage < stage::SB_PAYLOAD {
            (1, RecoveryRule::NoPayloadAttempt)
        } else if state.last_stage >= stage::OS_DRIVER {
            (1, RecoveryRule::OsReached)
        } else if !state.reset_cause.is_recoverable() {
            (1, RecoveryRule::NotRecoverable)
        } else if state.failure_count() < RECOVERY_THRESHOLD {
            (
                previous,
                RecoveryRule::Waiting {
                    count: state.failure_count(),
                },
            )
        } else {
            (previous + 1, RecoveryRule::Failed)
        };

        Self {
            index,
            rule,
            clear_count: matches!(
                rule,
                RecoveryRule::NoPayloadAttempt | RecoveryRule::OsReached | RecoveryRule::NotRecoverable
            ),
        }
    }

    /// Console line explaining the decision
    pub fn describe<C: Console + ?Sized>(&self, state: &RecoveryState, console: &mut C) {
        let line = match self.rule {
            RecoveryRule::NoPayloadAttempt => format!(
                "RECOVERY: SKIP stage 0x{:02x} < 0x{:02x}\n",
                state.last_stage,
                stage::SB_PAYLOAD
            ),
            RecoveryRule::OsReached => format!(
                "RECOVERY: CLEAR stage 0x{:02x} >= 0x{:02x}\n",
                state.last_stage,
                stage::OS_DRIVER
            ),
            RecoveryRule::NotRecoverable => String::from("RECOVERY: CLEAR not SW or WD\n"),
            RecoveryRule::Waiting { count } => format!("RECOVERY: WAIT reset_cnt={}\n", count),
            RecoveryRule::Failed => format!("RECOVERY: FAIL, booting {}\n", self.index),
        };
        console.print(&line);
    }
}

/// Read the recovery state, report it, and clear the failure counter when
/// the decision calls for it. Returns the chosen menu position.
pub fn evaluate<P: RegisterStore + Console + ?Sized>(io: &mut P) -> RecoveryDecision {
    let state = RecoveryState::read(io);
    io.print(&format!(
        "RECOVERY: cause=0x{:02x} stage=0x{:02x} boots=0x{:02x}\n",
        state.reset_cause.code(),
        state.last_stage,
        state.boot_source
    ));

    let decision = RecoveryDecision::decide(&state);
    decision.describe(&state, io);
    log::info!("recovery: {:?} -> entry {}", decision.rule, decision.index);

    if decision.clear_count {
        regs::clear_failure_count(io);
    }
    decision
}
