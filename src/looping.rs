//! The invoke loop.
//!
//! Resolve the prompt fresh, invoke, repeat. The loop stops on an interrupt
//! or at the optional iteration limit; a failing invocation never stops it
//! on its own.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::exit_codes;
use crate::io::executor::{Executor, InvokeOptions};
use crate::io::interrupt::InterruptFlag;
use crate::prompts::PromptSource;

/// Reason why [`run_loop`] stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopStop {
    /// A SIGINT arrived during the last invocation.
    Interrupted,
    /// The configured iteration limit was reached.
    IterationLimit { max_iterations: u32 },
}

/// Summary of a finished loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    /// Number of completed iterations.
    pub iterations: u32,
    /// Exit code of the final invocation; becomes the process exit code when
    /// the iteration limit stops the loop.
    pub last_exit_code: i32,
    pub stop: LoopStop,
}

/// Invoke the tool with the resolved prompt until interrupted or until
/// `max_iterations` is reached (`None` loops forever).
///
/// The prompt is re-resolved every iteration, so file-backed and numbered
/// prompts pick up edits made between invocations. Resolution failures abort
/// the loop; invocation failures (missing binary, non-zero exits, timeouts)
/// are reported by the executor and the loop continues.
pub fn run_loop<E: Executor>(
    root: &Path,
    executor: &E,
    source: &PromptSource,
    options: &InvokeOptions,
    max_iterations: Option<u32>,
    interrupt: &InterruptFlag,
) -> Result<LoopOutcome> {
    let mut iteration = 0u32;
    let mut last_exit_code = exit_codes::OK;
    loop {
        if let Some(limit) = max_iterations
            && iteration >= limit
        {
            info!(iterations = iteration, "iteration limit reached");
            return Ok(LoopOutcome {
                iterations: iteration,
                last_exit_code,
                stop: LoopStop::IterationLimit {
                    max_iterations: limit,
                },
            });
        }

        println!("Starting iteration: {iteration}");
        iteration += 1;

        let resolved = source.resolve(root)?;
        if let Some(origin) = &resolved.origin {
            println!("Using prompt from: {}", origin.display());
        }
        debug!(prompt_bytes = resolved.text.len(), "resolved prompt");

        last_exit_code = executor.invoke(&resolved.text, options)?;
        if interrupt.is_set() {
            println!("\nInterrupted by user");
            return Ok(LoopOutcome {
                iterations: iteration,
                last_exit_code: exit_codes::INTERRUPTED,
                stop: LoopStop::Interrupted,
            });
        }
        debug!(exit_code = last_exit_code, "invocation finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedExecutor;
    use std::path::PathBuf;

    #[test]
    fn stops_at_the_iteration_limit_with_the_last_exit_code() {
        let temp = tempfile::tempdir().expect("tempdir");
        let executor = ScriptedExecutor::new(vec![0, 3]);
        let interrupt = InterruptFlag::default();

        let outcome = run_loop(
            temp.path(),
            &executor,
            &PromptSource::Inline("hello".to_string()),
            &InvokeOptions::default(),
            Some(2),
            &interrupt,
        )
        .expect("loop");

        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.last_exit_code, 3);
        assert_eq!(outcome.stop, LoopStop::IterationLimit { max_iterations: 2 });
        assert_eq!(executor.prompts(), vec!["hello", "hello"]);
    }

    #[test]
    fn zero_iteration_limit_invokes_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let executor = ScriptedExecutor::new(Vec::new());
        let interrupt = InterruptFlag::default();

        let outcome = run_loop(
            temp.path(),
            &executor,
            &PromptSource::Inline("hello".to_string()),
            &InvokeOptions::default(),
            Some(0),
            &interrupt,
        )
        .expect("loop");

        assert_eq!(outcome.iterations, 0);
        assert_eq!(outcome.last_exit_code, exit_codes::OK);
        assert!(executor.prompts().is_empty());
    }

    #[test]
    fn interrupt_stops_the_loop_with_130() {
        let temp = tempfile::tempdir().expect("tempdir");
        let interrupt = InterruptFlag::default();
        let hook_flag = interrupt.clone();
        let executor = ScriptedExecutor::with_hook(vec![0], move |_| hook_flag.set());

        let outcome = run_loop(
            temp.path(),
            &executor,
            &PromptSource::Inline("hello".to_string()),
            &InvokeOptions::default(),
            None,
            &interrupt,
        )
        .expect("loop");

        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.last_exit_code, exit_codes::INTERRUPTED);
        assert_eq!(outcome.stop, LoopStop::Interrupted);
    }

    #[test]
    fn failing_invocations_do_not_stop_the_loop() {
        let temp = tempfile::tempdir().expect("tempdir");
        let executor = ScriptedExecutor::new(vec![5, 5, 5]);
        let interrupt = InterruptFlag::default();

        let outcome = run_loop(
            temp.path(),
            &executor,
            &PromptSource::Inline("hello".to_string()),
            &InvokeOptions::default(),
            Some(3),
            &interrupt,
        )
        .expect("loop");

        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.last_exit_code, 5);
    }

    #[test]
    fn file_prompts_are_reread_every_iteration() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("prompt.md");
        std::fs::write(&path, "first").expect("write prompt");

        let edit_path = path.clone();
        let executor = ScriptedExecutor::with_hook(vec![0, 0], move |_| {
            std::fs::write(&edit_path, "second").expect("rewrite prompt");
        });
        let interrupt = InterruptFlag::default();

        let outcome = run_loop(
            temp.path(),
            &executor,
            &PromptSource::File(PathBuf::from("prompt.md")),
            &InvokeOptions::default(),
            Some(2),
            &interrupt,
        )
        .expect("loop");

        assert_eq!(outcome.iterations, 2);
        assert_eq!(executor.prompts(), vec!["first", "second"]);
    }

    #[test]
    fn resolution_failure_aborts_the_loop() {
        let temp = tempfile::tempdir().expect("tempdir");
        let executor = ScriptedExecutor::new(Vec::new());
        let interrupt = InterruptFlag::default();

        let err = run_loop(
            temp.path(),
            &executor,
            &PromptSource::File(PathBuf::from("missing.md")),
            &InvokeOptions::default(),
            None,
            &interrupt,
        )
        .unwrap_err();

        assert!(err.to_string().contains("missing.md"));
        assert!(executor.prompts().is_empty());
    }
}
