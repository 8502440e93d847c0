//! The editable JSON form of a SYSCONF container.
//!
//! Every item becomes one entry keyed by its name:
//!
//! ```json
//! {
//!   "IPL.NIK": {
//!     "index": 3,
//!     "Type": "SMALLARRAY",
//!     "utf8": "Wii",
//!     "utf16": "NOT_UTF16_ALIGNED",
//!     "hex": "576969"
//!   }
//! }
//! ```
//!
//! Only `Type` and `hex` are read back. `index` fixes the item order; entries
//! without one come after the indexed entries, sorted by name. The `utf8` and
//! `utf16` renderings exist for reading and are ignored on import.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::kind::{ItemKind, UnknownKindName};
use crate::{Item, Sysconf};

/// Stands in for the UTF-16 rendering of an odd-length payload.
pub const NOT_UTF16_ALIGNED: &str = "NOT_UTF16_ALIGNED";

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("item {index} has a name that is not valid UTF-8: {name:02X?}")]
    NonUtf8Name { index: usize, name: Vec<u8> },

    #[error("item name `{0}` appears more than once")]
    DuplicateName(String),

    #[error("invalid kind for item `{name}`")]
    UnknownKindName {
        name: String,
        #[source]
        source: UnknownKindName,
    },

    #[error("invalid hex data for item `{name}`")]
    InvalidHex {
        name: String,
        #[source]
        source: hex::FromHexError,
    },

    #[error("invalid JSON document")]
    Json(#[from] serde_json::Error),
}

/// One entry of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(rename = "Type")]
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utf8: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utf16: Option<String>,

    pub hex: String,
}

/// Every entry keyed by item name. Repeated names are an error when
/// deserializing, never collapsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SysconfDocument {
    pub entries: BTreeMap<String, ItemEntry>,
}

/// Document entries in the order they appear in the source, duplicates kept.
struct EntryList(Vec<(String, ItemEntry)>);

impl<'de> Deserialize<'de> for EntryList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryListVisitor;

        impl<'de> Visitor<'de> for EntryListVisitor {
            type Value = EntryList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of item names to entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<EntryList, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, ItemEntry>()? {
                    entries.push(entry);
                }
                Ok(EntryList(entries))
            }
        }

        deserializer.deserialize_map(EntryListVisitor)
    }
}

impl<'de> Deserialize<'de> for SysconfDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let list = EntryList::deserialize(deserializer)?;
        SysconfDocument::from_entries(list.0).map_err(de::Error::custom)
    }
}

/// One character per payload byte.
pub fn render_bytes(payload: &[u8]) -> String {
    payload.iter().map(|b| *b as char).collect()
}

/// One character per big-endian 16-bit unit. Surrogate units become U+FFFD.
pub fn render_utf16_be(payload: &[u8]) -> String {
    if payload.len() % 2 != 0 {
        return NOT_UTF16_ALIGNED.to_string();
    }
    payload
        .chunks_exact(2)
        .map(|x| {
            let unit = u16::from_be_bytes([x[0], x[1]]);
            char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

impl ItemEntry {
    pub fn from_item(item: &Item, index: usize) -> ItemEntry {
        let (utf8, utf16) = if item.kind.is_array() {
            (
                Some(render_bytes(&item.payload)),
                Some(render_utf16_be(&item.payload)),
            )
        } else {
            (None, None)
        };

        ItemEntry {
            index: Some(index),
            kind: item.kind.name().to_string(),
            utf8,
            utf16,
            hex: hex::encode_upper(&item.payload),
        }
    }

    pub fn to_item(&self, name: &str) -> Result<Item, DocumentError> {
        let kind =
            self.kind
                .parse::<ItemKind>()
                .map_err(|source| DocumentError::UnknownKindName {
                    name: name.to_string(),
                    source,
                })?;
        let payload = hex::decode(&self.hex).map_err(|source| DocumentError::InvalidHex {
            name: name.to_string(),
            source,
        })?;

        Ok(Item {
            kind,
            name: name.as_bytes().to_vec(),
            payload,
        })
    }
}

impl SysconfDocument {
    fn from_entries(list: Vec<(String, ItemEntry)>) -> Result<SysconfDocument, DocumentError> {
        let mut entries = BTreeMap::new();
        for (name, entry) in list {
            if entries.contains_key(&name) {
                return Err(DocumentError::DuplicateName(name));
            }
            entries.insert(name, entry);
        }
        Ok(SysconfDocument { entries })
    }

    pub fn from_sysconf(sys: &Sysconf) -> Result<SysconfDocument, DocumentError> {
        let mut entries: BTreeMap<String, ItemEntry> = BTreeMap::new();

        for (index, item) in sys.iter().enumerate() {
            let name = std::str::from_utf8(&item.name).map_err(|_| DocumentError::NonUtf8Name {
                index,
                name: item.name.clone(),
            })?;

            if entries.contains_key(name) {
                return Err(DocumentError::DuplicateName(name.to_string()));
            }
            entries.insert(name.to_string(), ItemEntry::from_item(item, index));
        }

        tracing::debug!(entries = entries.len(), "built SysconfDocument");

        Ok(SysconfDocument { entries })
    }

    pub fn to_sysconf(&self) -> Result<Sysconf, DocumentError> {
        let mut ordered = self.entries.iter().collect::<Vec<_>>();
        // `None` sorts before `Some`, so flip it to put unindexed entries last.
        ordered.sort_by_key(|(name, entry)| (entry.index.is_none(), entry.index, *name));

        let mut seen = HashSet::new();
        let mut sys = Sysconf::new();
        for (name, entry) in ordered {
            if let Some(index) = entry.index {
                if !seen.insert(index) {
                    tracing::warn!(index, %name, "duplicate item index in document");
                }
            }
            sys.push(entry.to_item(name)?);
        }

        tracing::debug!(items = sys.item_count(), "built Sysconf from document");

        Ok(sys)
    }

    pub fn from_json(json: &[u8]) -> Result<SysconfDocument, DocumentError> {
        let list: EntryList = serde_json::from_slice(json)?;
        SysconfDocument::from_entries(list.0)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Sysconf {
    /// Render as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        SysconfDocument::from_sysconf(self)?.to_json_pretty()
    }

    /// Build a container from a JSON document.
    pub fn from_json(json: &[u8]) -> Result<Sysconf, DocumentError> {
        SysconfDocument::from_json(json)?.to_sysconf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Sysconf {
        Sysconf::from_items(vec![
            Item::new(ItemKind::SmallArray, "IPL.NIK", b"Wii".to_vec()),
            Item::new(ItemKind::Byte, "IPL.AR", [0x01]),
            Item::new(ItemKind::BigArray, "BT.DINF", [0x00, 0x57, 0x00, 0x69]),
            Item::new(ItemKind::LongLong, "IPL.CD2", [0xDE, 0xAD, 0xBE, 0xEF, 0, 1, 2, 3]),
        ])
    }

    #[test]
    fn entries_carry_kind_hex_and_renderings() {
        let doc = SysconfDocument::from_sysconf(&sample()).unwrap();

        let nik = &doc.entries["IPL.NIK"];
        assert_eq!(nik.index, Some(0));
        assert_eq!(nik.kind, "SMALLARRAY");
        assert_eq!(nik.hex, "576969");
        assert_eq!(nik.utf8.as_deref(), Some("Wii"));
        assert_eq!(nik.utf16.as_deref(), Some(NOT_UTF16_ALIGNED));

        let dinf = &doc.entries["BT.DINF"];
        assert_eq!(dinf.utf16.as_deref(), Some("Wi"));

        let cd2 = &doc.entries["IPL.CD2"];
        assert_eq!(cd2.hex, "DEADBEEF00010203");
        assert!(cd2.utf8.is_none());
        assert!(cd2.utf16.is_none());
    }

    #[test]
    fn scalar_entries_omit_renderings() {
        let json = sample().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let ar = value["IPL.AR"].as_object().unwrap();
        assert_eq!(ar.len(), 3);
        assert_eq!(ar["Type"], "BYTE");
        assert_eq!(ar["hex"], "01");
        assert_eq!(ar["index"], 1);
    }

    #[test]
    fn json_roundtrip_keeps_order() {
        let sys = sample();
        let json = sys.to_json().unwrap();
        assert_eq!(Sysconf::from_json(json.as_bytes()).unwrap(), sys);
    }

    #[test]
    fn renderings_are_ignored_on_import() {
        let json = br#"{
            "NAME": { "Type": "SMALLARRAY", "utf8": "nonsense", "utf16": "x", "hex": "abcd" }
        }"#;
        let sys = Sysconf::from_json(json).unwrap();
        assert_eq!(
            sys.items(),
            &[Item::new(ItemKind::SmallArray, "NAME", [0xAB, 0xCD])]
        );
    }

    #[test]
    fn unindexed_entries_sort_by_name_after_indexed() {
        let json = br#"{
            "B": { "Type": "BYTE", "hex": "02" },
            "A": { "Type": "BYTE", "hex": "01" },
            "Z": { "index": 0, "Type": "BOOL", "hex": "01" }
        }"#;
        let sys = Sysconf::from_json(json).unwrap();
        let names: Vec<_> = sys.iter().map(|i| i.name().to_vec()).collect();
        assert_eq!(names, [b"Z".to_vec(), b"A".to_vec(), b"B".to_vec()]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let sys = Sysconf::from_items(vec![
            Item::new(ItemKind::Byte, "IPL.AR", [0x01]),
            Item::new(ItemKind::Byte, "IPL.AR", [0x02]),
        ]);
        assert!(matches!(
            SysconfDocument::from_sysconf(&sys),
            Err(DocumentError::DuplicateName(name)) if name == "IPL.AR"
        ));
    }

    #[test]
    fn duplicate_names_in_json_are_rejected() {
        let json = br#"{
            "IPL.AR": { "index": 0, "Type": "BYTE", "hex": "01" },
            "IPL.AR": { "index": 1, "Type": "BYTE", "hex": "02" }
        }"#;
        assert!(matches!(
            Sysconf::from_json(json),
            Err(DocumentError::DuplicateName(name)) if name == "IPL.AR"
        ));

        let err = serde_json::from_slice::<SysconfDocument>(json).unwrap_err();
        assert!(err.to_string().contains("`IPL.AR` appears more than once"));
    }

    #[test]
    fn non_utf8_names_are_rejected() {
        let sys = Sysconf::from_items(vec![Item::new(ItemKind::Byte, vec![0xFFu8, 0xFE], [0])]);
        assert!(matches!(
            sys.to_json(),
            Err(DocumentError::NonUtf8Name { index: 0, .. })
        ));
    }

    #[test]
    fn bad_documents() {
        assert!(matches!(
            Sysconf::from_json(br#"{ "A": { "Type": "WORD", "hex": "01" } }"#),
            Err(DocumentError::UnknownKindName { name, .. }) if name == "A"
        ));
        assert!(matches!(
            Sysconf::from_json(br#"{ "A": { "Type": "BYTE", "hex": "0" } }"#),
            Err(DocumentError::InvalidHex { name, .. }) if name == "A"
        ));
        assert!(matches!(
            Sysconf::from_json(br#"{ "A": { "Type": "BYTE", "hex": "zz" } }"#),
            Err(DocumentError::InvalidHex { .. })
        ));
        assert!(matches!(
            Sysconf::from_json(br#"{ "A": { "Type": "BYTE" } }"#),
            Err(DocumentError::Json(_))
        ));
        assert!(matches!(
            Sysconf::from_json(b"[]"),
            Err(DocumentError::Json(_))
        ));
    }

    #[test]
    fn render_helpers() {
        assert_eq!(render_bytes(&[0x41, 0xE9]), "Aé");
        assert_eq!(render_utf16_be(&[0x00, 0x41, 0x30, 0x42]), "Aあ");
        assert_eq!(render_utf16_be(&[0xD8, 0x00]), "\u{FFFD}");
        assert_eq!(render_utf16_be(&[0x00]), NOT_UTF16_ALIGNED);
    }
}
