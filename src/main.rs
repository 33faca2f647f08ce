//! Loop driver for Claude Code.
//!
//! Resolves a prompt (inline text, a file, or a numbered file under
//! `.claude/prompts/`), runs `claude --print` with it, relays the output,
//! and repeats until interrupted or an optional iteration limit is reached.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};

use claude_loop::exit_codes;
use claude_loop::io::executor::{ClaudeExecutor, InvokeOptions};
use claude_loop::io::interrupt;
use claude_loop::looping::{LoopStop, run_loop};
use claude_loop::prompts::PromptSource;

#[derive(Parser)]
#[command(
    name = "claude-loop",
    version,
    about = "Run Claude Code with a prompt, in a loop",
    group(ArgGroup::new("source").required(true)),
    after_help = "Examples:\n    \
        claude-loop \"Fix the bug in main.rs\"\n    \
        claude-loop --file .claude/prompts/0035-improve-city-layout-coherence.md\n    \
        claude-loop --prompt-number 0035\n    \
        claude-loop --skip-permissions \"Run tests\""
)]
struct Cli {
    /// Prompt text to send to Claude Code.
    #[arg(group = "source", value_name = "PROMPT")]
    prompt: Option<String>,

    /// Read the prompt from a file.
    #[arg(short, long, group = "source", value_name = "PATH")]
    file: Option<PathBuf>,

    /// Prompt number (e.g. 0035 or 35) looked up in .claude/prompts/.
    #[arg(short = 'n', long, group = "source", value_name = "NUMBER")]
    prompt_number: Option<String>,

    /// Pass --dangerously-skip-permissions to Claude Code (use with caution).
    #[arg(long)]
    skip_permissions: bool,

    /// Don't stream output in real time; print it once per invocation.
    #[arg(short, long)]
    quiet: bool,

    /// Stop after this many iterations instead of looping forever.
    #[arg(long, value_name = "N")]
    max_iterations: Option<u32>,

    /// Kill an invocation that runs longer than this many seconds.
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,
}

impl Cli {
    fn source(&self) -> PromptSource {
        if let Some(path) = &self.file {
            PromptSource::File(path.clone())
        } else if let Some(number) = &self.prompt_number {
            PromptSource::Number(number.clone())
        } else {
            // The clap group guarantees exactly one source is present.
            PromptSource::Inline(self.prompt.clone().unwrap_or_default())
        }
    }
}

fn main() {
    claude_loop::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = std::env::current_dir().context("resolve working directory")?;
    let interrupt = interrupt::install()?;

    let options = InvokeOptions {
        skip_permissions: cli.skip_permissions,
        quiet: cli.quiet,
        timeout: cli.timeout_secs.map(Duration::from_secs),
    };

    let outcome = run_loop(
        &root,
        &ClaudeExecutor,
        &cli.source(),
        &options,
        cli.max_iterations,
        &interrupt,
    )?;

    Ok(match outcome.stop {
        LoopStop::Interrupted => exit_codes::INTERRUPTED,
        LoopStop::IterationLimit { .. } => outcome.last_exit_code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inline_prompt() {
        let cli = Cli::parse_from(["claude-loop", "hello"]);
        assert_eq!(cli.source(), PromptSource::Inline("hello".to_string()));
        assert!(!cli.skip_permissions);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_file_source() {
        let cli = Cli::parse_from(["claude-loop", "--file", "p.md"]);
        assert_eq!(cli.source(), PromptSource::File(PathBuf::from("p.md")));
    }

    #[test]
    fn parse_number_source_short_flag() {
        let cli = Cli::parse_from(["claude-loop", "-n", "35"]);
        assert_eq!(cli.source(), PromptSource::Number("35".to_string()));
    }

    #[test]
    fn parse_run_options() {
        let cli = Cli::parse_from([
            "claude-loop",
            "--skip-permissions",
            "-q",
            "--max-iterations",
            "3",
            "--timeout-secs",
            "90",
            "run tests",
        ]);
        assert!(cli.skip_permissions);
        assert!(cli.quiet);
        assert_eq!(cli.max_iterations, Some(3));
        assert_eq!(cli.timeout_secs, Some(90));
        assert_eq!(cli.source(), PromptSource::Inline("run tests".to_string()));
    }

    #[test]
    fn reject_missing_prompt_source() {
        assert!(Cli::try_parse_from(["claude-loop"]).is_err());
    }

    #[test]
    fn reject_multiple_prompt_sources() {
        assert!(Cli::try_parse_from(["claude-loop", "hello", "--file", "p.md"]).is_err());
        assert!(Cli::try_parse_from(["claude-loop", "--file", "p.md", "-n", "1"]).is_err());
    }
}
