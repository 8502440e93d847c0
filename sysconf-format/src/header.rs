use crate::kind::{ItemKind, UnknownKind};

/// Total size of a SYSCONF file. Every encoded container is exactly this long.
pub const FILE_SIZE: usize = 0x4000;

pub const MAGIC_BYTES: &[u8; 4] = b"SCv0";

/// Written at the very end of every encoded file. Never checked when decoding.
pub const TRAILER_BYTES: &[u8; 4] = b"SCed";

pub const TRAILER_OFFSET: usize = FILE_SIZE - TRAILER_BYTES.len();

pub(crate) const ITEM_COUNT_OFFSET: usize = 4;

pub(crate) const OFFSET_TABLE_START: usize = 6;

/// Entries in the legacy auxiliary lookup table. Nothing reads or writes it.
pub const RESERVED_LOOKUP_ENTRIES: usize = 39;

pub const MAX_NAME_LEN: usize = 32;

const NAME_LEN_MASK: u8 = 0x1F;
const KIND_SHIFT: u32 = 5;

/// First byte past the offset table (including the trailing past-last slot)
/// for a container of `item_count` items.
#[inline(always)]
pub(crate) const fn items_start(item_count: usize) -> usize {
    OFFSET_TABLE_START + item_count * 2 + 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("item name length {0} is outside of 1..=32")]
pub struct InvalidNameLength(pub usize);

/// The packed first byte of every item record: `kind:3 | (name_len - 1):5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader {
    kind: ItemKind,
    name_len: usize,
}

impl ItemHeader {
    pub fn new(kind: ItemKind, name_len: usize) -> Result<ItemHeader, InvalidNameLength> {
        if !(1..=MAX_NAME_LEN).contains(&name_len) {
            return Err(InvalidNameLength(name_len));
        }
        Ok(ItemHeader { kind, name_len })
    }

    #[inline(always)]
    pub fn kind(self) -> ItemKind {
        self.kind
    }

    #[inline(always)]
    pub fn name_len(self) -> usize {
        self.name_len
    }

    #[inline]
    pub fn encode(self) -> u8 {
        (self.kind.tag() << KIND_SHIFT) | ((self.name_len - 1) as u8 & NAME_LEN_MASK)
    }

    #[inline]
    pub fn decode(byte: u8) -> Result<ItemHeader, UnknownKind> {
        let kind = ItemKind::from_tag(byte >> KIND_SHIFT)?;
        let name_len = (byte & NAME_LEN_MASK) as usize + 1;
        Ok(ItemHeader { kind, name_len })
    }
}
