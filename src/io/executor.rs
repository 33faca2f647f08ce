//! Claude Code invocation.
//!
//! The [`Executor`] trait decouples the loop from the actual `claude` spawn.
//! Tests use scripted executors that return predetermined exit codes without
//! spawning processes.

use std::io::Write;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument, warn};

use crate::exit_codes;
use crate::io::process::{self, exit_code};

/// Name of the external tool on `PATH`.
pub const CLAUDE_BIN: &str = "claude";

/// Exit code reported when an invocation outlives `--timeout-secs`.
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Fixed options applied to every invocation.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Append `--dangerously-skip-permissions`.
    pub skip_permissions: bool,
    /// Capture output and print it once instead of streaming.
    pub quiet: bool,
    /// Kill the invocation after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Abstraction over the invocation backend.
pub trait Executor {
    /// Run the tool once with `prompt`, relay its output, and return its exit
    /// code. A missing binary and a timeout are reported here and folded into
    /// the code rather than propagated.
    fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<i32>;
}

/// Argument list for one invocation. The prompt is always last so no other
/// argument can be mistaken for part of it.
pub fn claude_args(prompt: &str, skip_permissions: bool) -> Vec<String> {
    let mut args = vec!["--print".to_string()];
    if skip_permissions {
        args.push("--dangerously-skip-permissions".to_string());
    }
    args.push(prompt.to_string());
    args
}

/// Executor that spawns `claude --print`.
pub struct ClaudeExecutor;

impl Executor for ClaudeExecutor {
    #[instrument(skip_all, fields(quiet = options.quiet, skip_permissions = options.skip_permissions))]
    fn invoke(&self, prompt: &str, options: &InvokeOptions) -> Result<i32> {
        println!(
            "Running: {CLAUDE_BIN} --print {}<prompt>",
            if options.skip_permissions {
                "--dangerously-skip-permissions "
            } else {
                ""
            }
        );
        println!("{}", "-".repeat(60));

        let mut cmd = Command::new(CLAUDE_BIN);
        cmd.args(claude_args(prompt, options.skip_permissions));
        debug!(prompt_bytes = prompt.len(), "invoking claude");

        let result = if options.quiet {
            run_quiet(cmd, options.timeout)
        } else {
            run_streamed(cmd, options.timeout)
        };

        match result {
            Ok(code) => Ok(code),
            Err(err) if is_not_found(&err) => {
                warn!("claude binary not found on PATH");
                eprintln!("Error: '{CLAUDE_BIN}' command not found. Is Claude Code installed?");
                Ok(exit_codes::INVALID)
            }
            Err(err) => Err(err),
        }
    }
}

fn run_streamed(cmd: Command, timeout: Option<Duration>) -> Result<i32> {
    let exit = process::run_streaming(cmd, timeout)?;
    if exit.timed_out {
        report_timeout(timeout);
        return Ok(TIMEOUT_EXIT_CODE);
    }
    Ok(exit_code(exit.status))
}

fn run_quiet(cmd: Command, timeout: Option<Duration>) -> Result<i32> {
    let output = process::run_captured(cmd, timeout)?;

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&output.stdout)
        .context("print captured stdout")?;
    stdout.flush().context("flush captured stdout")?;
    drop(stdout);
    if !output.stderr.is_empty() {
        std::io::stderr()
            .write_all(&output.stderr)
            .context("print captured stderr")?;
    }

    if output.timed_out {
        report_timeout(timeout);
        return Ok(TIMEOUT_EXIT_CODE);
    }
    Ok(exit_code(output.status))
}

fn report_timeout(timeout: Option<Duration>) {
    if let Some(limit) = timeout {
        eprintln!("Error: '{CLAUDE_BIN}' timed out after {}s", limit.as_secs());
    }
}

/// Spawn failures surface as `NotFound` io errors under the anyhow context
/// chain.
fn is_not_found(err: &anyhow::Error) -> bool {
    err.downcast_ref::<std::io::Error>()
        .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_without_bypass() {
        assert_eq!(claude_args("hello", false), vec!["--print", "hello"]);
    }

    #[test]
    fn args_with_bypass_keep_the_prompt_last() {
        let args = claude_args("run tests", true);
        assert_eq!(
            args,
            vec!["--print", "--dangerously-skip-permissions", "run tests"]
        );
        assert_eq!(args.last().map(String::as_str), Some("run tests"));
    }

    #[test]
    fn spawn_not_found_is_detected_through_the_context_chain() {
        let err =
            process::run_captured(Command::new("claude-loop-no-such-binary"), None).unwrap_err();
        assert!(is_not_found(&err));
    }
}
