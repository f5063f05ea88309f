//! cbws - an interactive editor for CBWS attack scripts
//!
//! Usage:
//!   cbws <script>          Open the script in the interactive prompt
//!   cbws <script> --info   Print the translated file info and exit
//!   cbws <script> --hex    Print the file hex and exit

use anyhow::{Context, Result};
use cbws_format::Document;
use clap::Parser;
use std::path::PathBuf;

mod session;

#[derive(Parser)]
#[command(name = "cbws")]
#[command(about = "Inspect and edit CBWS attack scripts", long_about = None)]
struct Cli {
    /// Path to the CBWS script file
    file: PathBuf,

    /// Print the translated file info and exit
    #[arg(long)]
    info: bool,

    /// Print the file hex and exit
    #[arg(long)]
    hex: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut doc = Document::load(&cli.file)
        .with_context(|| format!("Failed to load script: {}", cli.file.display()))?;

    if cli.hex {
        println!("{}", doc.hex());
        return Ok(());
    }
    if cli.info {
        session::print_file_info(&doc);
        return Ok(());
    }

    session::run(&mut doc)
}
