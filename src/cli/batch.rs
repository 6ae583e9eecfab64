use std::{
    io::Write,
    path::PathBuf,
};

use anyhow::Context;
use cfrnorm::{NormalizedRecord, normalize_records};
use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Normalize a JSON-lines file of document records")]
pub struct Batch {
    /// Path to the input file, one JSON document record per line
    input: PathBuf,

    /// Where to write normalized records; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl Batch {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let records = super::read_records(&self.input)?;
        tracing::info!(records = records.len(), "normalizing batch");

        let outcome = normalize_records(records);

        for failure in &outcome.failures {
            tracing::warn!(
                document_id = %failure.document_id,
                error = %failure.error,
                "record not normalized"
            );
        }

        self.write_records(&outcome.normalized)?;

        tracing::info!(
            normalized = outcome.normalized.len(),
            failed = outcome.failures.len(),
            "batch complete"
        );

        Ok(())
    }

    fn write_records(&self, records: &[NormalizedRecord]) -> anyhow::Result<()> {
        let mut writer: Box<dyn Write> = match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create {}", path.display()))?;
                Box::new(std::io::BufWriter::new(file))
            }
            None => Box::new(std::io::BufWriter::new(std::io::stdout().lock())),
        };

        for record in records {
            serde_json::to_writer(&mut writer, record)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        Ok(())
    }
}
