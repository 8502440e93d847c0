use std::path::{Path, PathBuf};

pub mod decode;
pub mod encode;

pub use decode::run as decode;
pub use encode::run as encode;

/// `path` with `ext` appended, keeping any extension it already has.
pub(crate) fn derived_path(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}
