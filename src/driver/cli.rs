//! CLI parsing using clap.

use clap::Parser as CliParser;
use std::path::PathBuf;

/// CLI interface.
#[derive(CliParser, Debug)]
#[clap(name = "c2zig", about = "Translate a semantically analyzed C unit to Zig")]
pub struct Cli {
    /// Input translation-unit dump (JSON, as exported by the front-end)
    #[clap(value_parser)]
    pub input: PathBuf,

    /// Output Zig file; stdout when omitted
    #[clap(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Enable verbose diagnostic output
    #[clap(short, long)]
    pub verbose: bool,
}
