//! Error types for boot orchestration
//!
//! None of these is fatal to the firmware. The worst outcome is
//! `ExhaustedSequence`, which ends in the bounded retry-and-restart path.

use core::fmt;

/// Result type for boot orchestration
pub type Result<T> = core::result::Result<T, BootError>;

/// Errors surfaced by the boot orchestration core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootError {
    /// No boot order source was supplied; kind defaults apply everywhere
    ConfigAbsent,

    /// Out of memory while storing a candidate or order entry; it is dropped
    AllocationFailure,

    /// No boot order entry matched the device path
    NoMatch,

    /// A boot attempt returned instead of handing off control
    DispatchFailure,

    /// Every BEV entry has been attempted
    ExhaustedSequence,
}

impl BootError {
    /// True when the boot cycle should move on to the next BEV entry
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::DispatchFailure)
    }
}

impl fmt::Display for BootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigAbsent => write!(f, "Boot order not configured"),
            Self::AllocationFailure => write!(f, "Out of memory"),
            Self::NoMatch => write!(f, "No matching boot order entry"),
            Self::DispatchFailure => write!(f, "Boot attempt failed"),
            Self::ExhaustedSequence => write!(f, "No bootable device"),
        }
    }
}
