use std::path::PathBuf;

use sysconf_format::{DocumentError, OpenError, SaveError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Cannot open SYSCONF file")]
    OpenSysconf(#[from] OpenError),

    #[error("Cannot save SYSCONF file `{}`", .path.display())]
    SaveSysconf {
        path: PathBuf,
        #[source]
        source: SaveError,
    },

    #[error("Cannot read document `{}`", .path.display())]
    ReadDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write document `{}`", .path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid SYSCONF document `{}`", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
}
