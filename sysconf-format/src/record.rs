use std::borrow::Cow;
use std::fmt;

use crate::kind::{ItemKind, PayloadShape};

/// A single named, typed entry of a SYSCONF container.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub kind: ItemKind,

    /// Raw name bytes, 1 to 32 of them. Not required to be UTF-8.
    pub name: Vec<u8>,

    /// The payload exactly as stored, without any length prefix.
    pub payload: Vec<u8>,
}

impl Item {
    pub fn new<N: Into<Vec<u8>>, P: Into<Vec<u8>>>(kind: ItemKind, name: N, payload: P) -> Item {
        Item {
            kind,
            name: name.into(),
            payload: payload.into(),
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    #[inline(always)]
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The name for display purposes, with invalid UTF-8 replaced.
    #[inline(always)]
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    #[inline(always)]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Bytes this item occupies on disk: header byte, name, length field and payload.
    pub fn encoded_len(&self) -> usize {
        let prefix = match self.kind.shape() {
            PayloadShape::Fixed(_) => 0,
            PayloadShape::Array { prefix, .. } => prefix,
        };
        1 + self.name.len() + prefix + self.payload.len()
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("kind", &self.kind)
            .field("name", &self.name_lossy())
            .field("payload", &hex::encode_upper(&self.payload))
            .finish()
    }
}
