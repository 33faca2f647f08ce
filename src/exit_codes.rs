//! Stable exit codes for the claude-loop CLI.

/// The iteration limit was reached and the final invocation succeeded.
pub const OK: i32 = 0;
/// Missing prompt file, unmatched prompt number, missing `claude` binary, or
/// any other fatal error.
pub const INVALID: i32 = 1;
/// A SIGINT arrived during an invocation.
pub const INTERRUPTED: i32 = 130;
