use std::fmt;
use std::str::FromStr;

pub mod constants {
    pub const KIND_BIG_ARRAY: u8 = 1;
    pub const KIND_SMALL_ARRAY: u8 = 2;
    pub const KIND_BYTE: u8 = 3;
    pub const KIND_SHORT: u8 = 4;
    pub const KIND_LONG: u8 = 5;
    pub const KIND_LONG_LONG: u8 = 6;
    pub const KIND_BOOL: u8 = 7;
}

use self::constants::*;

/// The type tag of a SYSCONF item, stored in the top 3 bits of the item header byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ItemKind {
    BigArray,
    SmallArray,
    Byte,
    Short,
    Long,
    LongLong,
    Bool,
}

/// How the payload of a kind is laid out after the item name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PayloadShape {
    /// Exactly this many bytes, no length field.
    Fixed(usize),
    /// A big-endian length field of `prefix` bytes holding `len - 1`, then up to `max` bytes.
    Array { prefix: usize, max: usize },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
#[error("unknown item kind tag: {0}")]
pub struct UnknownKind(pub u8);

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error(
    "unknown item kind name `{0}`, expected one of: {}",
    ItemKind::available_variants().join(", ")
)]
pub struct UnknownKindName(pub String);

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::BigArray,
        ItemKind::SmallArray,
        ItemKind::Byte,
        ItemKind::Short,
        ItemKind::Long,
        ItemKind::LongLong,
        ItemKind::Bool,
    ];

    pub fn available_variants() -> Vec<&'static str> {
        ItemKind::ALL.iter().map(|kind| kind.name()).collect()
    }

    pub const fn tag(self) -> u8 {
        use ItemKind::*;

        match self {
            BigArray => KIND_BIG_ARRAY,
            SmallArray => KIND_SMALL_ARRAY,
            Byte => KIND_BYTE,
            Short => KIND_SHORT,
            Long => KIND_LONG,
            LongLong => KIND_LONG_LONG,
            Bool => KIND_BOOL,
        }
    }

    pub const fn from_tag(tag: u8) -> Result<ItemKind, UnknownKind> {
        use ItemKind::*;

        let kind = match tag {
            KIND_BIG_ARRAY => BigArray,
            KIND_SMALL_ARRAY => SmallArray,
            KIND_BYTE => Byte,
            KIND_SHORT => Short,
            KIND_LONG => Long,
            KIND_LONG_LONG => LongLong,
            KIND_BOOL => Bool,
            other => return Err(UnknownKind(other)),
        };

        Ok(kind)
    }

    /// The canonical upper-case name used in text documents.
    pub const fn name(self) -> &'static str {
        use ItemKind::*;

        match self {
            BigArray => "BIGARRAY",
            SmallArray => "SMALLARRAY",
            Byte => "BYTE",
            Short => "SHORT",
            Long => "LONG",
            LongLong => "LONGLONG",
            Bool => "BOOL",
        }
    }

    pub const fn shape(self) -> PayloadShape {
        use ItemKind::*;

        match self {
            BigArray => PayloadShape::Array {
                prefix: 2,
                max: 0x1_0000,
            },
            SmallArray => PayloadShape::Array {
                prefix: 1,
                max: 0x100,
            },
            Byte | Bool => PayloadShape::Fixed(1),
            Short => PayloadShape::Fixed(2),
            Long => PayloadShape::Fixed(4),
            LongLong => PayloadShape::Fixed(8),
        }
    }

    #[inline(always)]
    pub const fn is_array(self) -> bool {
        matches!(self, ItemKind::BigArray | ItemKind::SmallArray)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for ItemKind {
    type Error = UnknownKind;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        ItemKind::from_tag(tag)
    }
}

impl From<ItemKind> for u8 {
    fn from(kind: ItemKind) -> u8 {
        kind.tag()
    }
}

impl FromStr for ItemKind {
    type Err = UnknownKindName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownKindName(s.to_string()))
    }
}
