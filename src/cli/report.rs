use std::path::PathBuf;

use cfrnorm::{AggregateOptions, Config, RangeMode, aggregate, normalize_records};
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Report how often each part number is cited")]
pub struct Report {
    /// Path to the input file, one JSON document record per line
    input: PathBuf,

    /// Only count documents of this type
    #[arg(long, default_value = "Rule")]
    document_type: String,

    /// Only count references citing this CFR title
    #[arg(long)]
    title: Option<u32>,

    /// Range attribution mode (per-part, endpoints)
    #[arg(long, value_name = "MODE")]
    range_mode: Option<RangeModeArg>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RangeModeArg {
    /// Count every part number a range covers
    PerPart,
    /// Count only a range's endpoints
    Endpoints,
}

impl From<RangeModeArg> for RangeMode {
    fn from(mode: RangeModeArg) -> Self {
        match mode {
            RangeModeArg::PerPart => Self::PerPart,
            RangeModeArg::Endpoints => Self::Endpoints,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Report {
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

        let mut options = AggregateOptions::new(&self.document_type, config);
        options.title = self.title;
        if let Some(mode) = self.range_mode {
            options.range_mode = mode.into();
        }

        let rows = aggregate(&outcome.normalized, &options);

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            OutputFormat::Table => Self::output_table(&rows, &self.document_type),
        }

        Ok(())
    }

    fn output_table(rows: &[cfrnorm::PartRow], document_type: &str) {
        if rows.is_empty() {
            println!("No part citations found for document type '{document_type}'.");
            return;
        }

        println!("{:<8} {:>8}  Agencies", "Part", "Count");
        println!("{}", "─".repeat(50).dim());
        for row in rows {
            println!(
                "{:<8} {:>8}  {}",
                row.part,
                row.count,
                row.agencies_display()
            );
        }
    }
}
