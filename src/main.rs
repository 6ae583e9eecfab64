//! Command-line front end for CFR citation normalization.

mod cli;

use clap::Parser;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().run()
}
