use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use strdoc_core::codes::CodeRegistry;
use strdoc_core::document::validate::validate;
use strdoc_core::document::xml;
use strdoc_core::samples;

#[derive(Parser)]
#[command(name = "strdoc")]
#[command(about = "KoFIU suspicious transaction report (STR) validator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    /// EUC-KR wire bytes (the canonical on-disk form)
    EucKr,
    Utf8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a report file and print every rule violation
    Validate {
        #[arg(long)]
        report: PathBuf,
        #[arg(long, value_enum, default_value = "euc-kr")]
        encoding: Encoding,
    },
    /// Write the bundled sample reports as EUC-KR XML files
    Sample {
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

type SampleFn = fn(
    &CodeRegistry,
) -> std::result::Result<
    strdoc_core::document::FinalizedDocument,
    strdoc_core::document::DocumentError,
>;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let codes = CodeRegistry::bundled();

    match cli.command {
        Commands::Validate { report, encoding } => {
            let bytes = std::fs::read(&report)
                .with_context(|| format!("failed to read {}", report.display()))?;
            let doc = match encoding {
                Encoding::EucKr => xml::parse_document_euc_kr(&bytes)?,
                Encoding::Utf8 => {
                    let text = String::from_utf8(bytes).context("report is not valid UTF-8")?;
                    xml::parse_document(&text)?
                }
            };

            let diagnostics = validate(&doc, &codes);
            if diagnostics.is_empty() {
                println!("{}: valid", report.display());
                return Ok(ExitCode::SUCCESS);
            }
            for diagnostic in &diagnostics {
                println!("{diagnostic}");
            }
            println!("{} violation(s)", diagnostics.len());
            Ok(ExitCode::FAILURE)
        }
        Commands::Sample { out_dir } => {
            std::fs::create_dir_all(&out_dir)
                .with_context(|| format!("failed to create {}", out_dir.display()))?;
            for (name, sample) in [
                ("str_personal.xml", samples::personal as SampleFn),
                ("str_corporate.xml", samples::corporate),
                ("str_corporate_multi_tx.xml", samples::corporate_multi_tx),
            ] {
                let doc = sample(&codes)?.into_inner();
                let bytes = xml::to_euc_kr(&doc)?;
                let path = out_dir.join(name);
                std::fs::write(&path, bytes)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("wrote {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
