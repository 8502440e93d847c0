use std::path::{Path, PathBuf};

use sysconf_format::Sysconf;

use crate::error::{Error, Result};

/// Decode the SYSCONF binary at `input` into a JSON document.
///
/// Returns the path the document was written to.
pub fn run(input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
    let output = output.unwrap_or_else(|| super::derived_path(input, "json"));

    let sys = Sysconf::open(input)?;
    tracing::info!(items = sys.item_count(), path = %input.display(), "decoded SYSCONF");

    let json = sys.to_json().map_err(|source| Error::Document {
        path: input.to_path_buf(),
        source,
    })?;

    std::fs::write(&output, json).map_err(|source| Error::WriteDocument {
        path: output.clone(),
        source,
    })?;

    Ok(output)
}
