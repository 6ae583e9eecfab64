use std::{path::PathBuf, process};

use cfrnorm::{Config, ParseStatus, StatusSummary, batch::select_records, normalize_records};
use clap::Parser;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser)]
#[command(about = "Summarize parse statuses and list citations worth review")]
pub struct Triage {
    /// Path to the input file, one JSON document record per line
    input: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Print only the selected document identifiers
    #[arg(long)]
    ids_only: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Triage {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let records = super::read_records(&self.input)?;
        let outcome = normalize_records(records);

        for failure in &outcome.failures {
            tracing::warn!(
                document_id = %failure.document_id,
                error = %failure.error,
                "record not normalized"
            );
        }

        let mut summary = StatusSummary::new(config.sample_limit());
        for record in &outcome.normalized {
            summary.observe(&record.citation);
        }
        let review = select_records(&outcome.normalized);

        if summary.total() == 0 {
            println!("No records found.");
            return Ok(());
        }

        // Identifier list bypasses all formatting, for piping into other
        // tools.
        if self.ids_only {
            for id in &review {
                println!("{id}");
            }
        } else {
            match self.output {
                OutputFormat::Json => Self::output_json(&summary, &review)?,
                OutputFormat::Table => Self::output_table(&summary, &review),
            }
        }

        // Exit with a non-zero code when citations need attention.
        if review.is_empty() {
            Ok(())
        } else {
            process::exit(2);
        }
    }

    fn output_json(summary: &StatusSummary, review: &[&str]) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "summary": summary,
            "total": summary.total(),
            "review": review,
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(summary: &StatusSummary, review: &[&str]) {
        const MAX_ID_DISPLAY: usize = 20;
        let narrow = is_narrow();

        println!("Parse statuses");
        println!("{}", "──────────────".dim());

        if narrow {
            // Stacked output for narrow terminals
            for status in ParseStatus::ALL {
                println!("{}: {}", status, summary.count(status));
            }
            println!("Total: {}", summary.total());
        } else {
            // Table layout
            println!("{:<15} Count", "Status");
            for status in ParseStatus::ALL {
                println!("{:<15} {}", status.to_string(), summary.count(status));
            }
            println!("{:<15} {}", "Total", summary.total());
        }

        println!();

        if review.is_empty() {
            println!("Needs review: {} ✅", "0".success());
            return;
        }

        println!(
            "Needs review: {} ⚠️",
            review.len().to_string().warning()
        );
        for id in review.iter().take(MAX_ID_DISPLAY) {
            println!("  • {id}");
        }
        if review.len() > MAX_ID_DISPLAY {
            println!("  • ... and {} more", review.len() - MAX_ID_DISPLAY);
        }

        for status in [ParseStatus::Unparsed, ParseStatus::MissingTitle] {
            let samples = summary.samples(status);
            if samples.is_empty() {
                continue;
            }
            println!();
            println!("Sample {status} citations:");
            for sample in samples {
                println!("{}", format!("  {sample}").dim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn run_succeeds_on_a_clean_corpus() {
        let mut input = tempfile::NamedTempFile::new().unwrap();
        writeln!(input, r#"{{"document_id": "A", "cfr_part": "42 CFR Part 412"}}"#).unwrap();
        writeln!(input, r#"{{"document_id": "B"}}"#).unwrap();

        let command = Triage {
            input: input.path().to_path_buf(),
            output: OutputFormat::default(),
            ids_only: false,
        };
        command
            .run(&Config::default())
            .expect("triage should succeed when nothing needs review");
    }

    #[test]
    fn run_succeeds_on_an_empty_file() {
        let input = tempfile::NamedTempFile::new().unwrap();

        let command = Triage {
            input: input.path().to_path_buf(),
            output: OutputFormat::Json,
            ids_only: false,
        };
        command
            .run(&Config::default())
            .expect("triage should succeed on an empty file");
    }
}
