//! Shard inspection commands.

use std::process::ExitCode;

use hfpics::{derive_shard_key, Retriever};

use super::common::{resolve_config, Overrides};
use crate::error::CliError;

/// Print the shard key and remote locations for an ID.
pub fn run_shard(id: u64, overrides: &Overrides) -> Result<ExitCode, CliError> {
    let config = resolve_config(overrides)?;
    let base_url = config.base_url();
    let shard = derive_shard_key(id);

    println!("ID:       {}", id);
    println!("Shard:    {}", shard);
    println!("Manifest: {}", shard.manifest_url(&base_url));
    println!("Archive:  {}", shard.archive_url(&base_url));
    Ok(ExitCode::SUCCESS)
}

/// Fetch the shard manifest and print the entry for an ID.
pub fn run_locate(id: u64, overrides: &Overrides) -> Result<ExitCode, CliError> {
    let config = resolve_config(overrides)?;
    let retriever = Retriever::new(config)?;
    let shard = derive_shard_key(id);

    let manifests = retriever.manifest_client();
    let manifest = manifests
        .fetch_manifest(&shard)
        .map_err(hfpics::RetrieveError::from)?;

    let located = manifests
        .locate(&manifest, id)
        .map_err(hfpics::RetrieveError::from)?;

    match located {
        Some((filename, entry)) => {
            println!("Shard:    {} ({} entries)", shard, manifest.len());
            println!("File:     {}", filename);
            println!("Offset:   {}", entry.offset);
            println!("Size:     {}", entry.size);
            println!("Archive:  {}", shard.archive_url(retriever.base_url()));
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("ID {} has no corresponding image in shard {}", id, shard);
            Ok(ExitCode::from(2))
        }
    }
}
