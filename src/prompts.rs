//! Prompt-source resolution.
//!
//! A prompt comes from exactly one of three places: inline text, a file, or
//! a numbered markdown file under [`PROMPTS_DIR`]. File-backed sources are
//! re-resolved on every loop iteration so edits made between invocations are
//! picked up.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::debug;

/// Directory searched for numbered prompt files, relative to the working
/// directory.
pub const PROMPTS_DIR: &str = ".claude/prompts";

/// Where the prompt text comes from. Exactly one source per run, enforced by
/// the CLI argument group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptSource {
    /// Literal text given on the command line.
    Inline(String),
    /// Full contents of this file.
    File(PathBuf),
    /// Numbered file under `.claude/prompts/`, e.g. `35` or `0035`.
    Number(String),
}

/// A resolved prompt, plus its origin path for file-backed sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrompt {
    pub text: String,
    pub origin: Option<PathBuf>,
}

impl PromptSource {
    /// Resolve this source to prompt text, rooted at `root`.
    pub fn resolve(&self, root: &Path) -> Result<ResolvedPrompt> {
        match self {
            PromptSource::Inline(text) => Ok(ResolvedPrompt {
                text: text.clone(),
                origin: None,
            }),
            PromptSource::File(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    root.join(path)
                };
                if !path.exists() {
                    bail!("file not found: {}", path.display());
                }
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("read prompt file {}", path.display()))?;
                Ok(ResolvedPrompt {
                    text,
                    origin: Some(path),
                })
            }
            PromptSource::Number(number) => {
                let path = find_prompt_file(root, number)?
                    .ok_or_else(|| anyhow!("no prompt file found for number: {number}"))?;
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("read prompt file {}", path.display()))?;
                Ok(ResolvedPrompt {
                    text,
                    origin: Some(path),
                })
            }
        }
    }
}

/// Zero-pad a numeric identifier to four digits. Identifiers already four or
/// more characters long pass through unchanged.
pub fn pad_number(raw: &str) -> String {
    format!("{raw:0>4}")
}

/// Locate the first file under `<root>/.claude/prompts/` named
/// `<padded>-*.md`. Directory-scan order decides ties. A missing prompts
/// directory counts as no match.
pub fn find_prompt_file(root: &Path, number: &str) -> Result<Option<PathBuf>> {
    let dir = root.join(PROMPTS_DIR);
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "prompts directory missing");
        return Ok(None);
    }

    let prefix = format!("{}-", pad_number(number));
    let entries = fs::read_dir(&dir).with_context(|| format!("read {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read entry in {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with(&prefix) && name.ends_with(".md") {
            debug!(file = name, "matched prompt file");
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}
