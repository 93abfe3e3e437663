use crate::config::Config;
use crate::discovery::{BatchFile, discover_batches};
use crate::error::ConvertError;
use crate::question::{FlatRow, flatten_batch};
use crate::writer::{compose_script, write_script};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// A batch that parsed and flattened cleanly.
#[derive(Debug)]
struct LoadedBatch {
    file_name: String,
    suffix: String,
    batch_id: u32,
    rows: Vec<FlatRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenScript {
    pub path: PathBuf,
    pub rows: usize,
    pub with_schema: bool,
}

#[derive(Debug)]
pub struct RunSummary {
    pub written: Vec<WrittenScript>,
    pub skipped: Vec<String>,
}

fn load_batch(batch: &BatchFile) -> Result<LoadedBatch, ConvertError> {
    let batch_id = batch.batch_id()?;
    let suffix = batch.suffix.clone().ok_or_else(|| ConvertError::BadBatchNumber {
        file: batch.file_name.clone(),
    })?;

    let content = fs::read_to_string(&batch.path).map_err(|source| ConvertError::Read {
        file: batch.file_name.clone(),
        source,
    })?;
    let data: Value = serde_json::from_str(&content).map_err(|source| ConvertError::MalformedJson {
        file: batch.file_name.clone(),
        source,
    })?;
    let rows = flatten_batch(&batch.file_name, &data, batch_id)?;

    Ok(LoadedBatch {
        file_name: batch.file_name.clone(),
        suffix,
        batch_id,
        rows,
    })
}

fn progress_bar(len: usize, enabled: bool) -> Result<ProgressBar> {
    if !enabled {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Writing schema files");
    Ok(pb)
}

/// Convert every batch in `config.input_dir` into a script in `config.output_dir`.
///
/// Batches are parsed in parallel and written in discovery order. The table
/// definition goes into the first script that is written.
pub fn run(config: &Config) -> Result<RunSummary> {
    let batches = discover_batches(&config.input_dir)?;

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("failed to create output directory {}", config.output_dir.display()))?;

    let pb = progress_bar(batches.len(), config.show_progress)?;
    let mut written = Vec::new();
    let mut skipped = Vec::new();

    // One batch per worker is in memory at a time; each window is written
    // out in order before the next one is read.
    let window = rayon::current_num_threads().max(1);
    for chunk in batches.chunks(window) {
        let loaded: Vec<Result<LoadedBatch, ConvertError>> = chunk.par_iter().map(load_batch).collect();

        for (batch, result) in chunk.iter().zip(loaded) {
            let loaded = match result {
                Ok(loaded) => loaded,
                Err(e) if config.strict && e.is_content_error() => {
                    pb.finish_and_clear();
                    return Err(e.into());
                }
                Err(e) => {
                    pb.suspend(|| tracing::warn!("{e}"));
                    skipped.push(batch.file_name.clone());
                    pb.inc(1);
                    continue;
                }
            };

            let with_schema = written.is_empty();
            let script = compose_script(&config.table, &loaded.file_name, loaded.batch_id, &loaded.rows, with_schema);
            let path = write_script(&config.output_dir, &loaded.suffix, &script)?;

            pb.suspend(|| {
                let name = path.file_name().unwrap_or_default().to_string_lossy();
                println!("  {}  ({} rows)", name, loaded.rows.len());
            });
            tracing::debug!(file = %loaded.file_name, with_schema, "wrote script");

            written.push(WrittenScript {
                path,
                rows: loaded.rows.len(),
                with_schema,
            });
            pb.inc(1);
        }
    }
    pb.finish_and_clear();

    if !skipped.is_empty() {
        tracing::info!(count = skipped.len(), "some batch files were skipped");
    }
    println!(
        "\nDone. Generated {} schema files in {}",
        written.len(),
        config.output_dir.display()
    );

    Ok(RunSummary {
        written,
        skipped,
    })
}
