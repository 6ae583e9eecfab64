use std::path::{Path, PathBuf};

mod batch;
mod normalize;
mod report;
mod terminal;
mod triage;

use anyhow::Context;
use batch::Batch;
use cfrnorm::{Config, DocumentRecord};
use clap::ArgAction;
use normalize::Normalize;
use report::Report;
use triage::Triage;

/// Read document records from a JSON-lines file.
///
/// This is a CLI boundary function: each non-blank line must hold one JSON
/// document record, and the first malformed line aborts with its line
/// number.
fn read_records(path: &Path) -> anyhow::Result<Vec<DocumentRecord>> {
    use std::io::BufRead;

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = std::io::BufReader::new(file);

    let bar = indicatif::ProgressBar::new_spinner().with_message("reading records");
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DocumentRecord = serde_json::from_str(&line)
            .with_context(|| format!("Invalid record on line {}", index + 1))?;
        records.push(record);
        bar.tick();
    }
    bar.finish_and_clear();

    Ok(records)
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = match &self.config {
            Some(path) => Config::load(path).map_err(|e| anyhow::anyhow!(e))?,
            None => Config::default(),
        };

        self.command.run(&config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Normalize a single citation string
    Normalize(Normalize),

    /// Normalize a file of document records
    Batch(Batch),

    /// Summarize parse statuses and list citations worth review
    ///
    /// A citation is worth review when its status is unparsed or
    /// missing_title: a rule change could still recover it.
    Triage(Triage),

    /// Report how often each part number is cited
    Report(Report),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Normalize(command) => command.run()?,
            Self::Batch(command) => command.run()?,
            Self::Triage(command) => command.run(config)?,
            Self::Report(command) => command.run(config)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn read_records_skips_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"document_id": "A", "cfr_part": "42 CFR Part 412"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"document_id": "B"}}"#).unwrap();

        let records = read_records(file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].document_id, "A");
        assert_eq!(records[1].document_id, "B");
    }

    #[test]
    fn read_records_reports_the_offending_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"document_id": "A"}}"#).unwrap();
        writeln!(file, "not json").unwrap();

        let error = read_records(file.path()).unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }

    #[test]
    fn read_records_missing_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_records(&tmp.path().join("missing.jsonl")).is_err());
    }
}
