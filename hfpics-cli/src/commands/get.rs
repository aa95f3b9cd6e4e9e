//! Get command - fetch one image by ID.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Args;
use hfpics::{Retrieval, Retriever, ReturnForm};

use super::common::{resolve_config, Overrides};
use crate::error::CliError;

/// Arguments for `hfpics get`.
#[derive(Debug, Args)]
pub struct GetArgs {
    /// Image ID
    pub id: u64,

    /// Emit the image bytes instead of the cache path
    #[arg(long)]
    pub content: bool,

    /// Write the image bytes to this file (implies --content)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl GetArgs {
    fn form(&self) -> ReturnForm {
        if self.content || self.output.is_some() {
            ReturnForm::Content
        } else {
            ReturnForm::Path
        }
    }
}

/// Run the get command.
///
/// Exits with status 2 when the dataset has no image for the ID.
pub fn run(args: GetArgs, overrides: &Overrides) -> Result<ExitCode, CliError> {
    let config = resolve_config(overrides)?;
    let retriever = Retriever::new(config)?;

    match retriever.retrieve(args.id, args.form())? {
        Retrieval::Path(path) => println!("{}", path.display()),
        Retrieval::Content(bytes) => match &args.output {
            Some(path) => write_file(path, &bytes)?,
            None => write_stdout(&bytes)?,
        },
        Retrieval::NotFound => {
            eprintln!("ID {} has no corresponding image", args.id);
            return Ok(ExitCode::from(2));
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    std::fs::write(path, bytes)
        .map_err(|e| CliError::Output(format!("failed to write {}: {}", path.display(), e)))?;
    eprintln!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_stdout(bytes: &[u8]) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(bytes)
        .and_then(|_| stdout.flush())
        .map_err(|e| CliError::Output(format!("failed to write to stdout: {}", e)))
}
