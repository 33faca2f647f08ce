//! Unattended loop driver for Claude Code.
//!
//! Repeatedly invokes the `claude` CLI with a prompt resolved from one of
//! three sources (inline text, a file, or a numbered file under
//! `.claude/prompts/`) and relays its output to the console. The crate
//! separates:
//!
//! - **[`prompts`]**: prompt-source resolution. Pure file lookup, rooted at a
//!   caller-supplied directory so tests run against temp trees.
//! - **[`io`]**: side-effecting operations (process spawning, output
//!   relaying, signal observation). The [`io::executor::Executor`] trait lets
//!   tests script invocations without spawning processes.
//! - **[`looping`]**: the iteration loop tying the two together.

pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod looping;
pub mod prompts;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
