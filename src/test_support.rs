//! Test-only helpers: scripted executors and prompt fixtures.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;

use crate::io::executor::{Executor, InvokeOptions};
use crate::prompts::PROMPTS_DIR;

/// Hook run on each scripted invocation with the 0-based invocation index.
type InvokeHook = Box<dyn Fn(u32) + Send + Sync>;

/// Executor returning scripted exit codes without spawning anything.
///
/// Records every prompt it is invoked with. Once the scripted codes run out,
/// further invocations return 0. An optional hook runs on each invocation,
/// letting tests flip the interrupt flag or edit prompt files mid-loop.
pub struct ScriptedExecutor {
    codes: Mutex<VecDeque<i32>>,
    prompts: Mutex<Vec<String>>,
    on_invoke: Option<InvokeHook>,
}

impl ScriptedExecutor {
    pub fn new(codes: Vec<i32>) -> Self {
        Self {
            codes: Mutex::new(codes.into()),
            prompts: Mutex::new(Vec::new()),
            on_invoke: None,
        }
    }

    /// Scripted executor that also runs `hook` on every invocation.
    pub fn with_hook(codes: Vec<i32>, hook: impl Fn(u32) + Send + Sync + 'static) -> Self {
        Self {
            on_invoke: Some(Box::new(hook)),
            ..Self::new(codes)
        }
    }

    /// Prompts seen so far, in invocation order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

impl Executor for ScriptedExecutor {
    fn invoke(&self, prompt: &str, _options: &InvokeOptions) -> Result<i32> {
        let index = {
            let mut prompts = self.prompts.lock().expect("prompts lock");
            prompts.push(prompt.to_string());
            (prompts.len() - 1) as u32
        };
        if let Some(hook) = &self.on_invoke {
            hook(index);
        }
        let code = self
            .codes
            .lock()
            .expect("codes lock")
            .pop_front()
            .unwrap_or(0);
        Ok(code)
    }
}

/// Create `<root>/.claude/prompts/<name>` with `contents`, returning its path.
pub fn write_numbered_prompt(root: &Path, name: &str, contents: &str) -> PathBuf {
    let dir = root.join(PROMPTS_DIR);
    std::fs::create_dir_all(&dir).expect("create prompts dir");
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write prompt file");
    path
}

/// Write an executable `claude` stub script into `dir`, returning its path.
///
/// Integration tests prepend `dir` to `PATH` so the loop spawns the stub
/// instead of the real tool.
#[cfg(unix)]
pub fn write_claude_stub(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("claude");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    let mut perms = std::fs::metadata(&path).expect("stub metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod stub");
    path
}
