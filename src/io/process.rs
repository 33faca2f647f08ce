//! Helpers for running the `claude` child process.
//!
//! Both modes drain stdout and stderr on dedicated threads while the parent
//! waits, so neither pipe can fill up and deadlock the child.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Captured child output from a buffered run.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub timed_out: bool,
}

/// Result of a streaming run; the output has already been echoed.
#[derive(Debug)]
pub struct StreamedExit {
    pub status: ExitStatus,
    pub timed_out: bool,
}

/// Run `cmd`, echoing each line of stdout and stderr to the console as it
/// arrives. Returns once the child exits (or is killed at `timeout`).
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs())))]
pub fn run_streaming(mut cmd: Command, timeout: Option<Duration>) -> Result<StreamedExit> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || echo_lines(stdout));
    let stderr_handle = thread::spawn(move || echo_lines(stderr));

    let (status, timed_out) = wait_child(&mut child, timeout)?;

    join_output(stdout_handle).context("join stdout")?;
    join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(StreamedExit { status, timed_out })
}

/// Run `cmd` to completion with stdout and stderr fully captured.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs())))]
pub fn run_captured(mut cmd: Command, timeout: Option<Duration>) -> Result<CommandOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("spawning child process");
    let mut child = cmd.spawn().context("spawn command")?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    let stdout_handle = thread::spawn(move || collect_stream(stdout));
    let stderr_handle = thread::spawn(move || collect_stream(stderr));

    let (status, timed_out) = wait_child(&mut child, timeout)?;

    let stdout = join_output(stdout_handle).context("join stdout")?;
    let stderr = join_output(stderr_handle).context("join stderr")?;

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

/// Exit code for a finished child: its own code, or `128 + signal` when a
/// signal killed it.
pub fn exit_code(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(1)
}

fn wait_child(child: &mut Child, timeout: Option<Duration>) -> Result<(ExitStatus, bool)> {
    let Some(limit) = timeout else {
        return Ok((child.wait().context("wait for command")?, false));
    };
    match child.wait_timeout(limit).context("wait for command")? {
        Some(status) => Ok((status, false)),
        None => {
            warn!(timeout_secs = limit.as_secs(), "command timed out, killing");
            child.kill().context("kill command")?;
            let status = child.wait().context("wait command after kill")?;
            Ok((status, true))
        }
    }
}

/// Echo a child stream to the console line by line, flushing per line so
/// output appears as the child produces it.
fn echo_lines<R: Read>(reader: R) -> Result<()> {
    let mut buf_reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = buf_reader
            .read_until(b'\n', &mut line)
            .context("read line")?;
        if n == 0 {
            break;
        }
        let mut out = std::io::stdout().lock();
        out.write_all(&line).context("echo line")?;
        out.flush().context("flush echoed line")?;
    }
    Ok(())
}

fn collect_stream<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).context("read output")?;
    Ok(buf)
}

fn join_output<T>(handle: thread::JoinHandle<Result<T>>) -> Result<T> {
    match handle.join() {
        Ok(result) => result,
        Err(_) => Err(anyhow!("output reader thread panicked")),
    }
}
