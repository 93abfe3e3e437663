use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod discovery;
mod error;
mod pipeline;
mod question;
mod sql;
mod writer;

use config::{Config, program_dir};
use sql::DEFAULT_TABLE;

/// Turn `batch_XX.json` question batches into `schema_XX.sql` scripts.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base directory for the default input/output layout [default: executable's directory]
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    input_dir: Option<PathBuf>,

    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    #[arg(long, value_name = "NAME", default_value = DEFAULT_TABLE)]
    table: String,

    /// Abort on malformed or unreadable batch files instead of skipping them
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    no_progress: bool,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        let root = match self.root {
            Some(root) => root,
            None => program_dir()?,
        };
        let mut config = Config::from_root(&root);
        if let Some(input_dir) = self.input_dir {
            config.input_dir = input_dir;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        config.table = self.table;
        config.strict = self.strict;
        config.show_progress = !self.no_progress;
        Ok(config)
    }
}

/// Filter from `RUST_LOG` directives, `info` when unset or unparsable.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = Args::parse().into_config()?;
    tracing::debug!(?config, "resolved configuration");

    let summary = pipeline::run(&config)?;
    if let Some(first) = summary.written.iter().find(|w| w.with_schema) {
        tracing::debug!(path = %first.path.display(), "table definition written");
    }
    tracing::debug!(
        written = summary.written.len(),
        rows = summary.written.iter().map(|w| w.rows).sum::<usize>(),
        skipped = summary.skipped.len(),
        "run complete"
    );
    Ok(())
}
