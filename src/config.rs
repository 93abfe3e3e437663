use crate::sql::DEFAULT_TABLE;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const INPUT_DIR_NAME: &str = "04_batched_questions";
pub const OUTPUT_DIR_NAME: &str = "schemas";

/// Everything a run needs, resolved up front and passed into the pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub table: String,
    /// Abort on unreadable or malformed batch files instead of skipping them.
    pub strict: bool,
    pub show_progress: bool,
}

impl Config {
    /// Standard layout under `root`: batches in `04_batched_questions/`,
    /// scripts in `schemas/`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            input_dir: root.join(INPUT_DIR_NAME),
            output_dir: root.join(OUTPUT_DIR_NAME),
            table: DEFAULT_TABLE.to_string(),
            strict: false,
            show_progress: true,
        }
    }
}

/// Directory holding the running executable.
pub fn program_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("failed to locate the running executable")?;
    let exe = exe.canonicalize().unwrap_or(exe);
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable path has no parent directory")
}
