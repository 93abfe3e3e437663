use crate::error::ConvertError;
use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static BATCH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^batch_(\d+)\.json$").expect("valid batch name pattern"));

/// A candidate input file found in the batch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    pub path: PathBuf,
    pub file_name: String,
    /// Digits from the file name, zero padding intact.
    pub suffix: Option<String>,
}

impl BatchFile {
    fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        if !(file_name.starts_with("batch_") && file_name.ends_with(".json")) {
            return None;
        }
        let suffix = BATCH_NAME
            .captures(&file_name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        Some(Self { path, file_name, suffix })
    }

    /// Numeric batch id, e.g. `batch_07.json` -> 7.
    pub fn batch_id(&self) -> Result<u32, ConvertError> {
        self.suffix
            .as_deref()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| ConvertError::BadBatchNumber { file: self.file_name.clone() })
    }
}

/// List `batch_*.json` files in `dir`, sorted by path.
///
/// Finding nothing (or no directory at all) is an error: there is no run to do.
pub fn discover_batches(dir: &Path) -> Result<Vec<BatchFile>> {
    if !dir.is_dir() {
        return Err(ConvertError::NoBatchFiles { dir: dir.to_path_buf() }.into());
    }

    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read batch directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(batch) = BatchFile::from_path(path) {
            files.push(batch);
        }
    }

    if files.is_empty() {
        return Err(ConvertError::NoBatchFiles { dir: dir.to_path_buf() }.into());
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(count = files.len(), dir = %dir.display(), "discovered batch files");
    Ok(files)
}
