//! Integration test: BT documents survive write → emit → read unchanged,
//! and section deduplication only ever changes layout, never content.

use proptest::prelude::*;
use tagtree::binary::*;
use tagtree::TreeError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_back(bytes: &[u8]) -> BinaryValue {
    let doc = Document::from_bytes(bytes).unwrap();
    BinaryValue::read(doc.root().unwrap()).unwrap()
}

fn no_dedup() -> WriteConfig {
    WriteConfig {
        section_deduplication: false,
        ..WriteConfig::default()
    }
}

fn link_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
}

// ---------------------------------------------------------------------------
// Tests: Round trip
// ---------------------------------------------------------------------------

#[test]
fn every_node_type_round_trips() {
    let value = BinaryValue::Dict(vec![
        (0, BinaryValue::Bool(true)),
        (1, BinaryValue::Int8(-128)),
        (2, BinaryValue::Int16(0x0CCC)),
        (3, BinaryValue::Int32(i32::MIN)),
        (4, BinaryValue::Int64(0x0AAA_AAAA_AAAA_AAAA)),
        (5, BinaryValue::Float32(423.6)),
        (6, BinaryValue::Float64(213.7)),
        (7, BinaryValue::Text("Bit by bit into the abyss!".into())),
        (
            8,
            BinaryValue::List(BinaryList::with_items(
                Tag::Int16,
                vec![BinaryValue::Int16(1), BinaryValue::Int16(-1)],
            )),
        ),
        (9, BinaryValue::Dict(vec![(65535, BinaryValue::Text(String::new()))])),
    ]);

    let emission = value.encode(&WriteConfig::default()).unwrap();
    assert_eq!(read_back(&emission.bytes), value);
}

#[test]
fn dict_preserves_insertion_order_and_duplicate_keys() {
    let mut arena = SectionArena::new();
    {
        let mut dict = arena.root().unwrap().dict();
        dict.put(9).unwrap().int32(1);
        dict.put(2).unwrap().int32(2);
        dict.put(9).unwrap().int32(3);
    }
    let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;

    let dict = Document::from_bytes(&bytes).unwrap().root().unwrap().as_dict().unwrap();
    let entries: Vec<(u16, i32)> = dict
        .iter()
        .map(|(key, node)| (key, node.as_i32().unwrap()))
        .collect();
    assert_eq!(entries, vec![(9, 1), (2, 2), (9, 3)]);
    // lookup is first match
    assert_eq!(dict.get(9).unwrap().as_i32().unwrap(), 1);
}

#[test]
fn dict_capacity_is_255_entries() {
    let mut arena = SectionArena::new();
    let mut dict = arena.root().unwrap().dict();
    for key in 0..255u16 {
        dict.put(key).unwrap().int16(key as i16);
    }
    assert!(matches!(
        dict.put(255).err().unwrap(),
        TreeError::CapacityExceeded(255)
    ));

    let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;
    let dict = Document::from_bytes(&bytes).unwrap().root().unwrap().as_dict().unwrap();
    assert_eq!(dict.len(), 255);
    assert_eq!(dict.get(254).unwrap().as_i16().unwrap(), 254);
}

#[test]
fn failed_writes_leave_dict_readable() {
    let mut arena = SectionArena::new();
    {
        let mut dict = arena.root().unwrap().dict();
        assert!(dict.put(1).unwrap().text("a\0b").is_err());
        drop(dict.put(3).unwrap());
        dict.put(2).unwrap().int32(7);
        dict.put(4).unwrap().text("tail").unwrap();
    }
    assert!(matches!(
        arena.root().err().unwrap(),
        TreeError::RootAlreadyWritten
    ));
    let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;

    let dict = Document::from_bytes(&bytes).unwrap().root().unwrap().as_dict().unwrap();
    let keys: Vec<u16> = dict.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, vec![2, 4]);
    assert_eq!(dict.get(2).unwrap().as_i32().unwrap(), 7);
    assert_eq!(dict.get(4).unwrap().as_text().unwrap().as_str().unwrap(), "tail");
    assert!(!dict.has(1));
}

#[test]
fn list_is_homogeneous() {
    let mut arena = SectionArena::new();
    let mut list = arena.root().unwrap().list(Tag::Float64);
    list.push(1.0f64).unwrap();
    assert!(matches!(
        list.push(1i64).unwrap_err(),
        TreeError::TypeMismatch {
            expected: "Float64",
            found: "Int64"
        }
    ));
    list.push(2.0f64).unwrap();

    let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;
    let root = Document::from_bytes(&bytes).unwrap().root().unwrap();
    assert_eq!(
        root.as_list_of(Tag::Float64).unwrap().values::<f64>().unwrap(),
        vec![1.0, 2.0]
    );
    assert!(root.as_list_of(Tag::Int64).is_err());
    assert!(root.as_list().unwrap().values::<i64>().is_err());
}

// ---------------------------------------------------------------------------
// Tests: Header
// ---------------------------------------------------------------------------

#[test]
fn header_points_at_root() {
    let mut arena = SectionArena::new();
    arena.root().unwrap().int64(7);
    let bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;

    let header = Header::decode(&bytes).unwrap();
    assert_eq!(header.version, FORMAT_VERSION);
    assert_eq!(header.endian, native_endianness());
    assert_eq!(header.flags, 0);
    assert_eq!(header.root_offset as usize, HEADER_SIZE);
    assert!(header.readable());
}

#[test]
fn foreign_endianness_is_rejected() {
    let mut arena = SectionArena::new();
    arena.root().unwrap().int64(7);
    let mut bytes = arena.emit(&WriteConfig::default()).unwrap().bytes;

    bytes[5] = if native_endianness() == ENDIAN_LITTLE {
        ENDIAN_BIG
    } else {
        ENDIAN_LITTLE
    };
    assert!(!Header::decode(&bytes).unwrap().readable());
    assert!(matches!(
        Document::from_bytes(&bytes).unwrap_err(),
        TreeError::UnsupportedEndianness(_)
    ));
}

#[test]
fn bad_signature_and_short_input() {
    let mut bytes = vec![0u8; HEADER_SIZE + 2];
    bytes[1] = b'X';
    assert!(matches!(
        Document::from_bytes(&bytes).unwrap_err(),
        TreeError::InvalidSignature(_)
    ));
    assert!(matches!(
        Document::from_bytes(&bytes[..4]).unwrap_err(),
        TreeError::Truncated { .. }
    ));
}

// ---------------------------------------------------------------------------
// Tests: Deduplication
// ---------------------------------------------------------------------------

#[test]
fn identical_texts_share_one_section() {
    let mut arena = SectionArena::new();
    {
        let mut list = arena.root().unwrap().list(Tag::Text);
        list.push_text("same").unwrap();
        list.push_text("same").unwrap();
    }

    let dedup = arena.emit(&WriteConfig::default()).unwrap();
    let plain = arena.emit(&no_dedup()).unwrap();

    assert_eq!(dedup.stats.hits, 1);
    assert_eq!(dedup.stats.bytes_skipped, 5);
    assert_eq!(plain.bytes.len(), dedup.bytes.len() + 5);

    // list record: count, element tag, then the two link slots
    let list = link_at(&dedup.bytes, HEADER_SIZE + 1) as usize;
    let first = link_at(&dedup.bytes, list + 5);
    let second = link_at(&dedup.bytes, list + 9);
    assert_eq!(first, second);

    assert_eq!(read_back(&dedup.bytes), read_back(&plain.bytes));
}

#[test]
fn sections_with_links_are_never_deduplicated() {
    let mut arena = SectionArena::new();
    {
        let mut list = arena.root().unwrap().list(Tag::Dict);
        for _ in 0..2 {
            let mut dict = list.push_dict().unwrap();
            dict.put(1).unwrap().text("x").unwrap();
        }
    }

    let emission = arena.emit(&WriteConfig::default()).unwrap();
    let offsets = &emission.offsets;
    // records: 0 root, 1 list, 2 dict, 3 text, 4 dict, 5 text
    assert_ne!(offsets[2], offsets[4]);
    assert_eq!(offsets[3], offsets[5]);
    assert_eq!(emission.stats.hits, 1);
}

#[test]
fn identical_link_free_dicts_are_deduplicated() {
    let mut arena = SectionArena::new();
    {
        let mut root = arena.root().unwrap().dict();
        for key in [3u16, 8] {
            let mut numbers = root.put(key).unwrap().dict();
            numbers.put(0).unwrap().int64(1);
            numbers.put(1).unwrap().int8(2);
        }
    }

    let emission = arena.emit(&WriteConfig::default()).unwrap();
    // records: 0 root slot, 1 outer dict, 2 and 3 the inner dicts
    assert_eq!(emission.offsets[2], emission.offsets[3]);
    assert_eq!(emission.stats.hits, 1);

    let dict = Document::from_bytes(&emission.bytes)
        .unwrap()
        .root()
        .unwrap()
        .as_dict()
        .unwrap();
    for key in [3, 8] {
        let numbers = dict.get(key).unwrap().as_dict().unwrap();
        assert_eq!(numbers.get(0).unwrap().as_i64().unwrap(), 1);
        assert_eq!(numbers.get(1).unwrap().as_i8().unwrap(), 2);
    }
}

#[test]
fn prefix_collision_is_a_near_miss() {
    let mut arena = SectionArena::new();
    {
        let mut list = arena.root().unwrap().list(Tag::Text);
        list.push_text("abcdXXX").unwrap();
        list.push_text("abcdYYY").unwrap();
    }

    let config = WriteConfig {
        hash_bytes: 4,
        ..WriteConfig::default()
    };
    let emission = arena.emit(&config).unwrap();
    assert_eq!(emission.stats.near_misses, 1);
    assert_eq!(emission.stats.hits, 0);

    let root = Document::from_bytes(&emission.bytes).unwrap().root().unwrap();
    let texts: Vec<String> = root
        .as_list_of(Tag::Text)
        .unwrap()
        .iter()
        .map(|node| node.as_text().unwrap().as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["abcdXXX", "abcdYYY"]);
}

#[test]
fn emission_without_header_starts_at_root() {
    let value = BinaryValue::Dict(vec![(1, BinaryValue::Text("hi".into()))]);
    let config = WriteConfig {
        include_header: false,
        ..WriteConfig::default()
    };
    let emission = value.encode(&config).unwrap();
    assert_eq!(emission.bytes[0], Tag::Dict as u8);

    let doc = Document::without_header(&emission.bytes);
    assert_eq!(BinaryValue::read(doc.root().unwrap()).unwrap(), value);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_scalar() -> impl Strategy<Value = BinaryValue> {
    prop_oneof![
        any::<bool>().prop_map(BinaryValue::Bool),
        any::<i8>().prop_map(BinaryValue::Int8),
        any::<i16>().prop_map(BinaryValue::Int16),
        any::<i32>().prop_map(BinaryValue::Int32),
        any::<i64>().prop_map(BinaryValue::Int64),
        (-1.0e6f32..1.0e6f32).prop_map(BinaryValue::Float32),
        (-1.0e12f64..1.0e12f64).prop_map(BinaryValue::Float64),
        "[a-z0-9 ]{0,12}".prop_map(BinaryValue::Text),
    ]
}

fn arb_value() -> impl Strategy<Value = BinaryValue> {
    arb_scalar().prop_recursive(3, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec((any::<u16>(), inner.clone()), 0..6)
                .prop_map(BinaryValue::Dict),
            // keep only items sharing the first item's tag
            prop::collection::vec(inner, 0..6).prop_map(|items| {
                let element = items.first().map(BinaryValue::tag).unwrap_or(Tag::Int32);
                let items = items.into_iter().filter(|item| item.tag() == element).collect();
                BinaryValue::List(BinaryList { element, items })
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_round_trip(value in arb_value()) {
        let emission = value.encode(&WriteConfig::default()).unwrap();
        prop_assert_eq!(read_back(&emission.bytes), value);
    }

    #[test]
    fn prop_dedup_only_shrinks(value in arb_value()) {
        let dedup = value.encode(&WriteConfig::default()).unwrap();
        let plain = value.encode(&no_dedup()).unwrap();
        prop_assert!(dedup.bytes.len() <= plain.bytes.len());
        prop_assert_eq!(
            plain.bytes.len() - dedup.bytes.len(),
            dedup.stats.bytes_skipped as usize
        );
        prop_assert_eq!(read_back(&dedup.bytes), read_back(&plain.bytes));
    }
}
