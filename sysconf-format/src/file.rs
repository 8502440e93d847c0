use std::path::{Path, PathBuf};

use crate::header::{RESERVED_LOOKUP_ENTRIES, TRAILER_BYTES};
use crate::record::Item;

/// Size in bytes of the reserved auxiliary lookup region.
pub const RESERVED_LEN: usize = RESERVED_LOOKUP_ENTRIES * 2;

/// A whole SYSCONF file: the ordered item list plus the fixed framing.
///
/// Item order is the order of the on-disk offset table and is significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sysconf {
    pub(crate) items: Vec<Item>,
    pub(crate) reserved: [u8; RESERVED_LEN],
}

impl Default for Sysconf {
    fn default() -> Self {
        Sysconf {
            items: Vec::new(),
            reserved: [0u8; RESERVED_LEN],
        }
    }
}

impl Sysconf {
    pub fn new() -> Sysconf {
        Sysconf::default()
    }

    pub fn from_items(items: Vec<Item>) -> Sysconf {
        Sysconf {
            items,
            ..Default::default()
        }
    }

    #[inline(always)]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    #[inline(always)]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// First item whose raw name equals `name`.
    pub fn get<N: AsRef<[u8]>>(&self, name: N) -> Option<&Item> {
        let name = name.as_ref();
        self.items.iter().find(|item| item.name == name)
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Swap out the item at `index` wholesale, returning the old one.
    pub fn replace(&mut self, index: usize, item: Item) -> Option<Item> {
        let slot = self.items.get_mut(index)?;
        Some(std::mem::replace(slot, item))
    }

    /// The fixed marker occupying the last four bytes of an encoded file.
    #[inline(always)]
    pub fn trailing_marker(&self) -> &'static [u8; 4] {
        TRAILER_BYTES
    }

    /// The legacy 39-entry lookup region. Always zero; never decoded or encoded.
    #[inline(always)]
    pub fn reserved(&self) -> &[u8; RESERVED_LEN] {
        &self.reserved
    }
}

impl<'a> IntoIterator for &'a Sysconf {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Item> for Sysconf {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Sysconf::from_items(iter.into_iter().collect())
    }
}

#[cfg(feature = "reader")]
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Failed to read SYSCONF file. Path: '{}'", .1.display())]
    ReadFailed(#[source] std::io::Error, PathBuf),

    #[error("Invalid SYSCONF data. Path: '{}'", .1.display())]
    InvalidData(#[source] crate::de::ParseError, PathBuf),
}

#[cfg(feature = "writer")]
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Cannot encode SYSCONF data")]
    Encode(#[source] crate::ser::WriteError),

    #[error("Failed to write SYSCONF file. Path: '{}'", .1.display())]
    WriteFailed(#[source] std::io::Error, PathBuf),
}

impl Sysconf {
    /// Read and decode a SYSCONF file from disk.
    #[cfg(feature = "reader")]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Sysconf, OpenError> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| OpenError::ReadFailed(e, path.to_path_buf()))?;
        crate::de::parse(&data).map_err(|e| OpenError::InvalidData(e, path.to_path_buf()))
    }

    /// Encode this container and write it to disk. Nothing is written if encoding fails.
    #[cfg(feature = "writer")]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        let data = crate::ser::write(self).map_err(SaveError::Encode)?;
        std::fs::write(path, &data[..]).map_err(|e| SaveError::WriteFailed(e, path.to_path_buf()))
    }
}
