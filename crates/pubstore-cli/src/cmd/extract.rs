//! Extract subcommand - print the papers of one document without storing them

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pubstore_core::SourceDocument;
use pubstore_pubmed::extract_papers;

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Source document (.xml or .xml.gz)
    pub file: PathBuf,

    /// One JSON object per paper instead of the summary line
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let doc = SourceDocument::open(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let stdout = std::io::stdout();
    let mut out = std::io::BufWriter::new(stdout.lock());
    let mut printed = 0usize;
    let mut skipped = 0usize;

    for item in extract_papers(doc.as_str()) {
        let paper = match item {
            Ok(paper) => paper,
            Err(e) if !e.is_fatal() => {
                log::warn!("{}: {e}, skipped", args.file.display());
                skipped += 1;
                continue;
            }
            Err(e) => {
                out.flush()?;
                return Err(e).with_context(|| format!("Failed to parse {}", args.file.display()));
            }
        };

        if args.json {
            serde_json::to_writer(&mut out, &paper).context("Failed to encode paper")?;
            writeln!(out)?;
        } else {
            writeln!(out, "{}", paper.quick_summary)?;
        }
        printed += 1;
    }

    out.flush()?;
    log::info!("{printed} papers ({skipped} skipped)");
    Ok(())
}
