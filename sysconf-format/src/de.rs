//! Decoding of the fixed-size SYSCONF layout.
//!
//! Everything here works on byte slices; file access lives in [`Sysconf::open`].

use byteorder::{BigEndian, ByteOrder};

use crate::header::{
    ItemHeader, FILE_SIZE, ITEM_COUNT_OFFSET, MAGIC_BYTES, OFFSET_TABLE_START,
};
use crate::kind::PayloadShape;
use crate::{Item, Sysconf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid SYSCONF size: got {0} bytes, need 16384")]
    InvalidSize(usize),

    #[error("invalid magic: got {0:02X?}, need \"SCv0\"")]
    BadMagic([u8; 4]),

    #[error("unknown item kind {tag} in item {index} at offset {offset:#x}")]
    UnknownKind { index: usize, offset: usize, tag: u8 },

    #[error("{field} offset {offset:#x} is outside of the buffer")]
    OffsetOutOfBounds { field: Field, offset: usize },

    #[error("insufficient data for {field} at offset {offset:#x}: need {needed} bytes, {available} available")]
    InsufficientData {
        field: Field,
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// The part of the layout a [`ParseError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    OffsetTable,
    OffsetPastLastItem,
    Item(usize),
    ItemName(usize),
    ItemLength(usize),
    ItemPayload(usize),
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::OffsetTable => write!(f, "offset table"),
            Field::OffsetPastLastItem => write!(f, "offset past last item"),
            Field::Item(i) => write!(f, "item {}", i),
            Field::ItemName(i) => write!(f, "name of item {}", i),
            Field::ItemLength(i) => write!(f, "length field of item {}", i),
            Field::ItemPayload(i) => write!(f, "payload of item {}", i),
        }
    }
}

#[inline]
fn take(data: &[u8], offset: usize, needed: usize, field: Field) -> Result<&[u8], ParseError> {
    let available = data.len().saturating_sub(offset);
    if available < needed {
        return Err(ParseError::InsufficientData {
            field,
            offset,
            needed,
            available,
        });
    }
    Ok(&data[offset..offset + needed])
}

/// Decode the item table at the start of `data`.
///
/// Returns the offsets of every item and the offset past the last item.
pub fn parse_offset_table(data: &[u8]) -> Result<(Vec<usize>, usize), ParseError> {
    let magic = take(data, 0, MAGIC_BYTES.len(), Field::OffsetTable)?;
    if magic != MAGIC_BYTES {
        let mut got = [0u8; 4];
        got.copy_from_slice(magic);
        return Err(ParseError::BadMagic(got));
    }

    let count = take(data, ITEM_COUNT_OFFSET, 2, Field::OffsetTable)?;
    let item_count = BigEndian::read_u16(count) as usize;

    let table = take(data, OFFSET_TABLE_START, item_count * 2, Field::OffsetTable)?;
    let offsets = table
        .chunks_exact(2)
        .map(|x| BigEndian::read_u16(x) as usize)
        .collect::<Vec<_>>();

    let past_last_at = OFFSET_TABLE_START + item_count * 2;
    let past_last = BigEndian::read_u16(take(
        data,
        past_last_at,
        2,
        Field::OffsetPastLastItem,
    )?) as usize;
    if past_last > data.len() {
        return Err(ParseError::OffsetOutOfBounds {
            field: Field::OffsetPastLastItem,
            offset: past_last,
        });
    }

    tracing::debug!(
        item_count,
        past_last = format_args!("{:#x}", past_last),
        "parsed offset table"
    );

    Ok((offsets, past_last))
}

/// Decode the item record starting at `offset`.
///
/// Returns the item and the number of bytes it occupies.
pub fn parse_item(data: &[u8], index: usize, offset: usize) -> Result<(Item, usize), ParseError> {
    if offset >= data.len() {
        return Err(ParseError::OffsetOutOfBounds {
            field: Field::Item(index),
            offset,
        });
    }

    let header = ItemHeader::decode(data[offset]).map_err(|e| ParseError::UnknownKind {
        index,
        offset,
        tag: e.0,
    })?;

    let mut pos = offset + 1;
    let name = take(data, pos, header.name_len(), Field::ItemName(index))?.to_vec();
    pos += header.name_len();

    let len = match header.kind().shape() {
        PayloadShape::Fixed(len) => len,
        PayloadShape::Array { prefix, .. } => {
            let field = take(data, pos, prefix, Field::ItemLength(index))?;
            pos += prefix;
            BigEndian::read_uint(field, prefix) as usize + 1
        }
    };

    let payload = take(data, pos, len, Field::ItemPayload(index))?.to_vec();
    pos += len;

    tracing::debug!(
        start = format_args!("{:#x}", offset),
        end = format_args!("{:#x}", pos),
        bytes = pos - offset,
        index,
        kind = %header.kind(),
        name = %String::from_utf8_lossy(&name),
        "parsed Item"
    );

    Ok((
        Item {
            kind: header.kind(),
            name,
            payload,
        },
        pos - offset,
    ))
}

/// Decode a complete SYSCONF buffer.
///
/// The trailing marker at the end of the buffer is not checked.
pub fn parse(data: &[u8]) -> Result<Sysconf, ParseError> {
    if data.len() != FILE_SIZE {
        return Err(ParseError::InvalidSize(data.len()));
    }

    let (offsets, _) = parse_offset_table(data)?;

    let items = offsets
        .iter()
        .enumerate()
        .map(|(index, &offset)| parse_item(data, index, offset).map(|(item, _)| item))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(items = items.len(), "parsed Sysconf");

    Ok(Sysconf::from_items(items))
}

impl Sysconf {
    /// Decode a complete SYSCONF buffer. See [`parse`].
    #[inline(always)]
    pub fn from_bytes(data: &[u8]) -> Result<Sysconf, ParseError> {
        parse(data)
    }
}
