//! Encoding into the fixed-size SYSCONF layout.

use std::io::{Cursor, Seek, SeekFrom, Write};

use byteorder::{BigEndian, WriteBytesExt};

use crate::header::{
    items_start, InvalidNameLength, ItemHeader, FILE_SIZE, ITEM_COUNT_OFFSET, MAGIC_BYTES,
    OFFSET_TABLE_START, TRAILER_BYTES, TRAILER_OFFSET,
};
use crate::kind::{ItemKind, PayloadShape};
use crate::{Item, Sysconf};

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("a SYSCONF file must contain at least one item")]
    EmptyContainer,

    #[error("name of item {index} is empty")]
    EmptyName { index: usize },

    #[error("name of item {index} (`{name}`) is {len} bytes long, the limit is 32")]
    NameTooLong {
        index: usize,
        name: String,
        len: usize,
    },

    #[error("{kind} item {index} (`{name}`) has {len} bytes of data, the limit is {max}")]
    ArrayTooLarge {
        index: usize,
        name: String,
        kind: ItemKind,
        len: usize,
        max: usize,
    },

    #[error("{kind} item {index} (`{name}`) has {len} bytes of data, expected {expected}")]
    SizeMismatch {
        index: usize,
        name: String,
        kind: ItemKind,
        len: usize,
        expected: String,
    },

    #[error("item {index} (`{name}`) ends at {end:#x}, past the trailer at 0x3ffc")]
    BufferOverflow {
        index: usize,
        name: String,
        end: usize,
    },

    #[error("offset table for {item_count} items does not fit in the file")]
    TableOverflow { item_count: usize },

    #[error("I/O error while encoding")]
    Io(#[from] std::io::Error),
}

fn header_for(item: &Item, index: usize) -> Result<ItemHeader, WriteError> {
    ItemHeader::new(item.kind, item.name.len()).map_err(|InvalidNameLength(len)| {
        if len == 0 {
            WriteError::EmptyName { index }
        } else {
            WriteError::NameTooLong {
                index,
                name: item.name_lossy().into_owned(),
                len,
            }
        }
    })
}

fn validate(item: &Item, index: usize) -> Result<(), WriteError> {
    header_for(item, index)?;

    let len = item.payload.len();
    match item.kind.shape() {
        PayloadShape::Fixed(expected) if len != expected => Err(WriteError::SizeMismatch {
            index,
            name: item.name_lossy().into_owned(),
            kind: item.kind,
            len,
            expected: expected.to_string(),
        }),
        PayloadShape::Array { .. } if len == 0 => Err(WriteError::SizeMismatch {
            index,
            name: item.name_lossy().into_owned(),
            kind: item.kind,
            len,
            expected: "at least 1".into(),
        }),
        PayloadShape::Array { max, .. } if len > max => Err(WriteError::ArrayTooLarge {
            index,
            name: item.name_lossy().into_owned(),
            kind: item.kind,
            len,
            max,
        }),
        _ => Ok(()),
    }
}

/// Check every item and compute where each one starts.
///
/// Returns the item offsets and the offset past the last item.
pub fn layout(sys: &Sysconf) -> Result<(Vec<u16>, u16), WriteError> {
    if sys.is_empty() {
        return Err(WriteError::EmptyContainer);
    }

    let item_count = sys.item_count();
    let mut pos = items_start(item_count);
    if pos > TRAILER_OFFSET {
        return Err(WriteError::TableOverflow { item_count });
    }

    let mut offsets = Vec::with_capacity(item_count);
    for (index, item) in sys.iter().enumerate() {
        validate(item, index)?;

        let end = pos + item.encoded_len();
        if end > TRAILER_OFFSET {
            return Err(WriteError::BufferOverflow {
                index,
                name: item.name_lossy().into_owned(),
                end,
            });
        }

        offsets.push(pos as u16);
        pos = end;
    }

    Ok((offsets, pos as u16))
}

fn write_item<W: Write>(writer: &mut W, item: &Item, index: usize) -> Result<(), WriteError> {
    writer.write_u8(header_for(item, index)?.encode())?;
    writer.write_all(&item.name)?;

    let len = item.payload.len();
    match item.kind {
        ItemKind::BigArray => writer.write_u16::<BigEndian>((len - 1) as u16)?,
        ItemKind::SmallArray => writer.write_u8((len - 1) as u8)?,
        _ => {}
    }

    writer.write_all(&item.payload)?;
    Ok(())
}

/// Encode `sys` into a complete SYSCONF image.
///
/// All items are validated before anything is written, so an error never
/// leaves a partially encoded buffer behind.
pub fn write(sys: &Sysconf) -> Result<Box<[u8; FILE_SIZE]>, WriteError> {
    let (offsets, past_last) = layout(sys)?;

    let mut buf = Box::new([0u8; FILE_SIZE]);
    let mut cursor = Cursor::new(&mut buf[..]);

    cursor.write_all(MAGIC_BYTES)?;
    cursor.seek(SeekFrom::Start(ITEM_COUNT_OFFSET as u64))?;
    cursor.write_u16::<BigEndian>(sys.item_count() as u16)?;

    // Items first, then go back and fill in the table.
    cursor.seek(SeekFrom::Start(items_start(sys.item_count()) as u64))?;
    for (index, item) in sys.iter().enumerate() {
        let start = cursor.position();
        debug_assert_eq!(start, offsets[index] as u64);
        write_item(&mut cursor, item, index)?;

        tracing::debug!(
            start = format_args!("{:#x}", start),
            end = format_args!("{:#x}", cursor.position()),
            bytes = cursor.position() - start,
            index,
            kind = %item.kind,
            name = %item.name_lossy(),
            "serialized Item"
        );
    }

    cursor.seek(SeekFrom::Start(OFFSET_TABLE_START as u64))?;
    for offset in offsets.iter() {
        cursor.write_u16::<BigEndian>(*offset)?;
    }
    cursor.write_u16::<BigEndian>(past_last)?;

    cursor.seek(SeekFrom::Start(TRAILER_OFFSET as u64))?;
    cursor.write_all(TRAILER_BYTES)?;

    tracing::debug!(
        items = sys.item_count(),
        past_last = format_args!("{:#x}", past_last),
        free = TRAILER_OFFSET - past_last as usize,
        "serialized Sysconf"
    );

    Ok(buf)
}

impl Sysconf {
    /// Encode into a complete SYSCONF image. See [`write`].
    #[inline(always)]
    pub fn to_bytes(&self) -> Result<Box<[u8; FILE_SIZE]>, WriteError> {
        write(self)
    }
}
