//! aidata CLI: turn spreadsheet content into AI-readable site data.
//!
//! Reads tabular content records and writes schema.org JSON-LD, grouped
//! markdown documents, and a link manifest with canonical and raw URLs.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
