//! Round-trip tests across the binary codec and the JSON document.
#![cfg(feature = "writer")]

use proptest::prelude::*;
use sysconf_format::{de, ser, Item, ItemKind, ParseError, Sysconf, FILE_SIZE};

/// Strategy for a payload matching the shape of `kind`.
fn payload_strategy(kind: ItemKind) -> BoxedStrategy<Vec<u8>> {
    match kind {
        ItemKind::BigArray => prop::collection::vec(any::<u8>(), 1..300).boxed(),
        ItemKind::SmallArray => prop::collection::vec(any::<u8>(), 1..=256).boxed(),
        ItemKind::Byte | ItemKind::Bool => prop::collection::vec(any::<u8>(), 1).boxed(),
        ItemKind::Short => prop::collection::vec(any::<u8>(), 2).boxed(),
        ItemKind::Long => prop::collection::vec(any::<u8>(), 4).boxed(),
        ItemKind::LongLong => prop::collection::vec(any::<u8>(), 8).boxed(),
    }
}

fn kind_strategy() -> impl Strategy<Value = ItemKind> {
    prop::sample::select(ItemKind::ALL.to_vec())
}

fn item_strategy() -> impl Strategy<Value = Item> {
    (kind_strategy(), "[A-Z]{2,4}\\.[A-Z0-9]{1,27}").prop_flat_map(|(kind, name)| {
        payload_strategy(kind).prop_map(move |payload| Item::new(kind, name.clone(), payload))
    })
}

/// Up to 24 items with unique names.
fn sysconf_strategy() -> impl Strategy<Value = Sysconf> {
    prop::collection::vec(item_strategy(), 1..24).prop_map(|items| {
        let mut seen = std::collections::HashSet::new();
        items
            .into_iter()
            .filter(|item| seen.insert(item.name.clone()))
            .collect::<Sysconf>()
    })
}

proptest! {
    #[test]
    fn binary_roundtrip(sys in sysconf_strategy()) {
        let buf = ser::write(&sys).unwrap();
        prop_assert_eq!(buf.len(), FILE_SIZE);
        prop_assert_eq!(&buf[FILE_SIZE - 4..], b"SCed");

        let parsed = de::parse(&buf[..]).unwrap();
        prop_assert_eq!(&parsed, &sys);
        prop_assert!(parsed.reserved().iter().all(|b| *b == 0));
    }

    #[test]
    fn json_roundtrip(sys in sysconf_strategy()) {
        let json = sys.to_json().unwrap();
        let back = Sysconf::from_json(json.as_bytes()).unwrap();
        prop_assert_eq!(&back, &sys);

        // And the re-encoded image is byte-identical.
        let original = ser::write(&sys).unwrap();
        let reencoded = ser::write(&back).unwrap();
        prop_assert_eq!(&reencoded[..], &original[..]);
    }

    #[test]
    fn arbitrary_bytes_never_panic(tail in prop::collection::vec(any::<u8>(), FILE_SIZE - 4)) {
        let mut data = b"SCv0".to_vec();
        data.extend_from_slice(&tail);
        let _ = de::parse(&data);
    }
}

#[test]
fn single_byte_item_file() {
    let sys = Sysconf::from_items(vec![Item::new(ItemKind::Byte, "A", [0x01])]);
    let buf = sys.to_bytes().unwrap();

    let mut expected = vec![0u8; FILE_SIZE];
    expected[..13].copy_from_slice(&[
        0x53, 0x43, 0x76, 0x30, 0x00, 0x01, 0x00, 0x0A, 0x00, 0x0D, 0x60, 0x41, 0x01,
    ]);
    expected[FILE_SIZE - 4..].copy_from_slice(&[0x53, 0x43, 0x65, 0x64]);
    assert_eq!(&buf[..], &expected[..]);

    let parsed = Sysconf::from_bytes(&expected).unwrap();
    assert_eq!(parsed.items(), &[Item::new(ItemKind::Byte, "A", [0x01])]);
}

#[test]
fn small_array_scenario() {
    let sys = Sysconf::from_items(vec![Item::new(
        ItemKind::SmallArray,
        "IPL.NIK",
        [0xAB, 0xCD, 0xEF],
    )]);
    let buf = sys.to_bytes().unwrap();
    assert_eq!(&buf[10..12], &[0x46, b'I']);
    assert_eq!(&buf[18..22], &[0x02, 0xAB, 0xCD, 0xEF]);
    assert_eq!(Sysconf::from_bytes(&buf[..]).unwrap(), sys);
}

#[test]
fn boundary_array_lengths() {
    let sys = Sysconf::from_items(vec![
        Item::new(ItemKind::SmallArray, "MAX", vec![0xA5u8; 256]),
        Item::new(ItemKind::SmallArray, "MIN", vec![0x5Au8; 1]),
        Item::new(ItemKind::BigArray, "BIG", vec![0x11u8; 0x3000]),
    ]);
    let buf = sys.to_bytes().unwrap();
    assert_eq!(Sysconf::from_bytes(&buf[..]).unwrap(), sys);
}

#[test]
fn corrupt_magic_and_trailer() {
    let sys = Sysconf::from_items(vec![Item::new(ItemKind::Bool, "IPL.CB", [1])]);
    let buf = sys.to_bytes().unwrap();

    for i in 0..4 {
        let mut data = buf.to_vec();
        data[i] = data[i].wrapping_add(1);
        assert!(matches!(
            Sysconf::from_bytes(&data),
            Err(ParseError::BadMagic(_))
        ));
    }

    let mut data = buf.to_vec();
    data[FILE_SIZE - 4..].fill(0);
    assert_eq!(Sysconf::from_bytes(&data).unwrap(), sys);
}

#[test]
fn short_buffer_is_an_error() {
    let sys = Sysconf::from_items(vec![Item::new(ItemKind::Bool, "IPL.CB", [1])]);
    let buf = sys.to_bytes().unwrap();
    for len in [0, 3, 13, FILE_SIZE - 1] {
        assert_eq!(
            Sysconf::from_bytes(&buf[..len]),
            Err(ParseError::InvalidSize(len))
        );
    }
}

#[test]
fn hand_written_document_encodes() {
    let json = br#"{
        "IPL.LNG": { "Type": "BYTE", "hex": "01" },
        "IPL.AR": { "Type": "BYTE", "hex": "01" },
        "IPL.NIK": { "Type": "SMALLARRAY", "hex": "0057006900690000" }
    }"#;
    let sys = Sysconf::from_json(json).unwrap();
    let names: Vec<_> = sys.iter().map(|i| i.name_lossy().into_owned()).collect();
    assert_eq!(names, ["IPL.AR", "IPL.LNG", "IPL.NIK"]);

    let buf = sys.to_bytes().unwrap();
    assert_eq!(Sysconf::from_bytes(&buf[..]).unwrap(), sys);
}
