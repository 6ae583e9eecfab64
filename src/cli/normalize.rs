use clap::Parser;
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Normalize a single citation string")]
pub struct Normalize {
    /// The raw citation text
    citation: String,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Normalize {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let normalized = cfrnorm::normalize(Some(&self.citation))?;

        let json = if self.pretty {
            serde_json::to_string_pretty(&normalized)?
        } else {
            serde_json::to_string(&normalized)?
        };
        println!("{json}");

        Ok(())
    }
}
