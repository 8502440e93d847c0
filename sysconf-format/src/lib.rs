//! Reading and writing of SYSCONF configuration containers.
//!
//! A SYSCONF file is a fixed 16 KiB image holding a table of named, typed
//! items. Use [`Sysconf::open`] / [`de::parse`] to decode one,
//! [`Sysconf::save`] / [`ser::write`] to encode one, and [`document`] to move
//! between a container and its editable JSON form.

#[cfg(feature = "reader")]
pub mod de;
pub mod document;
mod file;
pub mod header;
pub mod kind;
mod record;
#[cfg(feature = "writer")]
pub mod ser;

#[cfg(feature = "reader")]
pub use de::ParseError;
pub use document::{DocumentError, ItemEntry, SysconfDocument};
#[cfg(feature = "reader")]
pub use file::OpenError;
#[cfg(feature = "writer")]
pub use file::SaveError;
pub use file::{Sysconf, RESERVED_LEN};
pub use header::{InvalidNameLength, ItemHeader, FILE_SIZE};
pub use kind::{ItemKind, UnknownKind, UnknownKindName};
pub use record::Item;
#[cfg(feature = "writer")]
pub use ser::WriteError;
