//! Process exit status of the `osc` binary
//!
//! `osc exists` reports absence through status 5, so scripts branch on these
//! values directly.

use osc_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Local IO, config file or serialization failure
    GeneralError = 1,
    /// Bad argument, remote path or profile setting
    UsageError = 2,
    /// Transport failure after the retry budget is spent
    NetworkError = 3,
    /// Credentials rejected by the store
    AuthError = 4,
    /// Missing object or profile
    NotFound = 5,
    /// Ctrl+C
    Interrupted = 130,
}

impl ExitCode {
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err.exit_code() {
            2 => Self::UsageError,
            3 => Self::NetworkError,
            4 => Self::AuthError,
            5 => Self::NotFound,
            _ => Self::GeneralError,
        }
    }
}
