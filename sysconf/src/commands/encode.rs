use std::path::{Path, PathBuf};

use sysconf_format::Sysconf;

use crate::error::{Error, Result};

/// Encode the JSON document at `input` into a SYSCONF binary.
///
/// Returns the path the binary was written to.
pub fn run(input: &Path, output: Option<PathBuf>) -> Result<PathBuf> {
    let output = output.unwrap_or_else(|| super::derived_path(input, "bin"));

    let json = std::fs::read(input).map_err(|source| Error::ReadDocument {
        path: input.to_path_buf(),
        source,
    })?;

    let sys = Sysconf::from_json(&json).map_err(|source| Error::Document {
        path: input.to_path_buf(),
        source,
    })?;

    sys.save(&output).map_err(|source| Error::SaveSysconf {
        path: output.clone(),
        source,
    })?;
    tracing::info!(items = sys.item_count(), path = %input.display(), "encoded SYSCONF");

    Ok(output)
}
