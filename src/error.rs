use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning batch files into SQL scripts.
///
/// `NoBatchFiles` ends the run. Everything else is scoped to a single batch
/// file and the pipeline decides whether to skip or abort.
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No batch files found in {}", dir.display())]
    NoBatchFiles { dir: PathBuf },

    #[error("Skipping {file}: cannot parse batch number")]
    BadBatchNumber { file: String },

    #[error("Skipping {file}: top-level JSON is not an array")]
    NotAnArray { file: String },

    #[error("Skipping {file}: malformed JSON: {source}")]
    MalformedJson {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Skipping {file}: read failed: {source}")]
    Read {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Whether `--strict` turns this error into a fatal one.
    pub fn is_content_error(&self) -> bool {
        matches!(self, Self::MalformedJson { .. } | Self::Read { .. })
    }
}
