use proptest::prelude::*;
use series_serdes::{
    deserialize, from_bytes, serialize, to_bytes, FormatError, GroupId, IteratorGroup, IteratorGroups, IteratorStatus,
    Sample, SerdesError, SerdesOptions, SeriesId, SeriesIterator, TagOrder,
};

const T0: u64 = 1486045801000;
const T1: u64 = 1486045871000;
const T2: u64 = 1486045881000;

fn cpu_id(host: &str) -> SeriesId {
    SeriesId::builder()
        .metric("sys.cpu.user")
        .tag("host", host)
        .tag("dc", "phx")
        .build()
        .unwrap()
}

fn shard(host: &str, values: [Sample; 3]) -> SeriesIterator {
    SeriesIterator::new(cpu_id(host), values.to_vec())
}

/// Two groups sharing the same two series ids with distinct values.
fn fixture() -> IteratorGroups {
    let mut groups = IteratorGroups::new();
    groups
        .add_iterator(
            "a",
            shard(
                "web01",
                [Sample::new(T0, 42i64, 1), Sample::new(T1, 9866.854, 0), Sample::new(T2, -128i64, 1024)],
            ),
        )
        .unwrap();
    groups
        .add_iterator(
            "a",
            shard(
                "web02",
                [Sample::new(T0, 8i64, 1), Sample::new(T1, f64::NAN, 0), Sample::new(T2, 5000i64, 1024)],
            ),
        )
        .unwrap();
    groups
        .add_iterator(
            "b",
            shard(
                "web01",
                [Sample::new(T0, 5i64, 1), Sample::new(T1, f64::NAN, 0), Sample::new(T2, 2i64, 1024)],
            ),
        )
        .unwrap();
    groups
        .add_iterator(
            "b",
            shard(
                "web02",
                [Sample::new(T0, 20i64, 1), Sample::new(T1, f64::NAN, 0), Sample::new(T2, 13i64, 1024)],
            ),
        )
        .unwrap();
    groups
}

/// Round-trip through an in-memory sink and source.
fn roundtrip(groups: &IteratorGroups) -> IteratorGroups {
    let mut out = Vec::new();
    serialize(None, Some(&mut out), Some(groups)).unwrap();
    deserialize(None, Some(&mut out.as_slice())).expect("deserialize failed")
}

/// Drains a decoded entry, checking the status before every pull.
fn drain(group: &mut IteratorGroup, index: usize) -> Vec<Sample> {
    let it = group.entry_mut(index).unwrap().numeric_mut().unwrap();
    let mut out = Vec::new();
    while it.status() == IteratorStatus::HasData {
        out.push(it.next().unwrap());
    }
    assert!(it.next().is_err());
    out
}

#[test]
fn test_full_serdes() {
    let mut decoded = roundtrip(&fixture());
    assert_eq!(decoded.len(), 2);

    // Group a
    let group = decoded.group_mut(&GroupId::from("a")).unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group.entry(0).unwrap().id(), &cpu_id("web01"));
    assert_eq!(group.entry(0).unwrap().numeric().unwrap().id(), &cpu_id("web01"));

    let it = group.entry_mut(0).unwrap().numeric_mut().unwrap();
    assert_eq!(it.status(), IteratorStatus::HasData);
    let v = it.next().unwrap();
    assert_eq!(v.timestamp, T0);
    assert!(v.value.is_integer());
    assert_eq!(v.value.as_integer(), Some(42));
    assert_eq!(v.real_count, 1);

    assert_eq!(it.status(), IteratorStatus::HasData);
    let v = it.next().unwrap();
    assert_eq!(v.timestamp, T1);
    assert!(!v.value.is_integer());
    assert!((v.value.to_f64() - 9866.854).abs() < 0.0001);
    assert_eq!(v.real_count, 0);

    assert_eq!(it.status(), IteratorStatus::HasData);
    let v = it.next().unwrap();
    assert_eq!(v.timestamp, T2);
    assert_eq!(v.value.as_integer(), Some(-128));
    assert_eq!(v.real_count, 1024);
    assert_eq!(it.status(), IteratorStatus::EndOfData);

    assert_eq!(group.entry(1).unwrap().id(), &cpu_id("web02"));
    let samples = drain(group, 1);
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[0].value.as_integer(), Some(8));
    assert!(samples[1].value.as_float().unwrap().is_nan());
    assert_eq!(samples[2].value.as_integer(), Some(5000));
    assert_eq!(samples[2].real_count, 1024);

    // Group b
    let group = decoded.group_mut(&GroupId::from("b")).unwrap();
    assert_eq!(group.len(), 2);
    assert_eq!(group.entry(0).unwrap().id(), &cpu_id("web01"));
    let values: Vec<Option<i64>> = drain(group, 0).iter().map(|s| s.value.as_integer()).collect();
    assert_eq!(values, [Some(5), None, Some(2)]);
    assert_eq!(group.entry(1).unwrap().id(), &cpu_id("web02"));
    let values: Vec<Option<i64>> = drain(group, 1).iter().map(|s| s.value.as_integer()).collect();
    assert_eq!(values, [Some(20), None, Some(13)]);
}

#[test]
fn test_roundtrip_equals_input() {
    let input = fixture();
    assert_eq!(roundtrip(&input), input);
}

#[test]
fn test_empty_collection() {
    let decoded = roundtrip(&IteratorGroups::new());
    assert!(decoded.is_empty());
}

#[test]
fn test_invalid_arguments() {
    let groups = fixture();
    let mut out = Vec::new();

    let err = serialize::<Vec<u8>>(None, None, Some(&groups)).unwrap_err();
    assert!(matches!(err, SerdesError::InvalidArgument(_)));

    let err = serialize(None, Some(&mut out), None).unwrap_err();
    assert!(matches!(err, SerdesError::InvalidArgument(_)));
    assert!(out.is_empty());

    let err = deserialize::<&[u8]>(None, None).unwrap_err();
    assert!(matches!(err, SerdesError::InvalidArgument(_)));
}

#[test]
fn test_group_and_entry_order() {
    let mut groups = IteratorGroups::new();
    for name in ["z", "a", "m"] {
        for host in ["web03", "web01", "web02"] {
            groups
                .add_iterator(name, SeriesIterator::new(cpu_id(host), Vec::new()))
                .unwrap();
        }
    }
    let decoded = roundtrip(&groups);
    let names: Vec<&str> = decoded.group_ids().map(GroupId::as_str).collect();
    assert_eq!(names, ["z", "a", "m"]);
    for group in &decoded {
        let hosts: Vec<&str> = group.entries().map(|e| e.id().tag("host").unwrap()).collect();
        assert_eq!(hosts, ["web03", "web01", "web02"]);
    }
}

#[test]
fn test_status_machine() {
    let mut groups = IteratorGroups::new();
    groups
        .add_iterator("a", SeriesIterator::new(cpu_id("web01"), Vec::new()))
        .unwrap();
    let samples: Vec<Sample> = (0..5).map(|i| Sample::new(T0 + i, i as i64, 1)).collect();
    groups
        .add_iterator("a", SeriesIterator::new(cpu_id("web02"), samples.clone()))
        .unwrap();

    let mut decoded = roundtrip(&groups);
    let group = decoded.group_mut(&GroupId::from("a")).unwrap();

    let empty = group.entry_mut(0).unwrap().numeric_mut().unwrap();
    assert_eq!(empty.status(), IteratorStatus::EndOfData);
    assert!(empty.next().is_err());

    let it = group.entry_mut(1).unwrap().numeric_mut().unwrap();
    for expected in &samples {
        assert_eq!(it.status(), IteratorStatus::HasData);
        assert_eq!(&it.next().unwrap(), expected);
    }
    assert_eq!(it.status(), IteratorStatus::EndOfData);
}

#[test]
fn test_every_truncation_is_format_error() {
    let bytes = to_bytes(None, &fixture()).unwrap();
    for len in 0..bytes.len() {
        let err = from_bytes(None, &bytes[..len]).unwrap_err();
        assert!(
            matches!(err, SerdesError::Format(FormatError::UnexpectedEnd { .. })),
            "prefix of {len} bytes gave {err:?}"
        );
    }
}

#[test]
fn test_trailing_bytes_rejected() {
    let mut bytes = to_bytes(None, &fixture()).unwrap();
    bytes.push(0);
    let err = from_bytes(None, &bytes).unwrap_err();
    assert!(matches!(err, SerdesError::Format(FormatError::TrailingBytes(1))));
}

#[test]
fn test_back_to_back_collections() {
    let first = fixture();
    let mut second = IteratorGroups::new();
    second
        .add_iterator("c", SeriesIterator::builder(cpu_id("web03")).push(T2, -7i64, 3).build())
        .unwrap();

    let mut stream = Vec::new();
    serialize(None, Some(&mut stream), Some(&first)).unwrap();
    serialize(None, Some(&mut stream), Some(&IteratorGroups::new())).unwrap();
    serialize(None, Some(&mut stream), Some(&second)).unwrap();

    let mut input = stream.as_slice();
    assert_eq!(deserialize(None, Some(&mut input)).unwrap(), first);
    assert!(deserialize(None, Some(&mut input)).unwrap().is_empty());
    assert_eq!(deserialize(None, Some(&mut input)).unwrap(), second);
    assert!(input.is_empty());

    let err = deserialize(None, Some(&mut input)).unwrap_err();
    assert!(matches!(
        err,
        SerdesError::Format(FormatError::UnexpectedEnd { needed: 4, offset: 0 })
    ));
}

#[test]
fn test_deserialize_through_buffered_reader() {
    let mut stream = Vec::new();
    for _ in 0..2 {
        serialize(None, Some(&mut stream), Some(&fixture())).unwrap();
    }
    let mut reader = std::io::BufReader::with_capacity(7, std::io::Cursor::new(stream));
    for _ in 0..2 {
        assert_eq!(deserialize(None, Some(&mut reader)).unwrap(), fixture());
    }
}

#[test]
fn test_sorted_tags_are_reproducible() {
    let a = SeriesId::builder().metric("m").tag("x", "1").tag("y", "2").build().unwrap();
    let b = SeriesId::builder().metric("m").tag("y", "2").tag("x", "1").build().unwrap();
    let mut left = IteratorGroups::new();
    left.add_iterator("g", SeriesIterator::new(a, Vec::new())).unwrap();
    let mut right = IteratorGroups::new();
    right.add_iterator("g", SeriesIterator::new(b, Vec::new())).unwrap();

    assert_eq!(to_bytes(None, &left).unwrap(), to_bytes(None, &right).unwrap());

    let insertion = SerdesOptions::new().with_tag_order(TagOrder::Insertion);
    let left_bytes = to_bytes(Some(&insertion), &left).unwrap();
    let right_bytes = to_bytes(Some(&insertion), &right).unwrap();
    assert_ne!(left_bytes, right_bytes);
    // Both decode to equal ids either way.
    assert_eq!(from_bytes(None, &left_bytes).unwrap(), from_bytes(None, &right_bytes).unwrap());
}

#[test]
fn test_multiple_metrics() {
    let id = SeriesId::builder()
        .metrics(["sys.cpu.user", "sys.cpu.sys"])
        .build()
        .unwrap();
    let mut groups = IteratorGroups::new();
    groups
        .add_iterator("g", SeriesIterator::builder(id.clone()).push(T0, 1.5, 2).build())
        .unwrap();
    let decoded = roundtrip(&groups);
    let entry = decoded.group(&GroupId::from("g")).unwrap().entry(0).unwrap();
    assert_eq!(entry.id().metrics(), ["sys.cpu.user", "sys.cpu.sys"]);
    assert_eq!(entry.id(), &id);
}

// ── property tests ─────────────────────────────────────────────────────

fn arb_sample() -> impl Strategy<Value = Sample> {
    let value = prop_oneof![
        any::<i64>().prop_map(series_serdes::NumericValue::Integer),
        any::<u64>().prop_map(|bits| series_serdes::NumericValue::Float(f64::from_bits(bits))),
    ];
    (any::<u64>(), value, any::<u32>()).prop_map(|(timestamp, value, real_count)| Sample {
        timestamp,
        value,
        real_count,
    })
}

fn arb_groups() -> impl Strategy<Value = IteratorGroups> {
    let series = (
        "[a-z.]{1,12}",
        prop::collection::vec(("[a-z]{1,4}", "[a-z0-9]{0,6}"), 0..4),
        prop::collection::vec(arb_sample(), 0..8),
    );
    prop::collection::vec(("[a-z]{1,6}", prop::collection::vec(series, 0..4)), 0..4).prop_map(|groups| {
        let mut out = IteratorGroups::new();
        for (name, entries) in groups {
            for (metric, tags, samples) in entries {
                let mut builder = SeriesId::builder().metric(metric);
                for (k, v) in tags {
                    builder = builder.tag(k, v);
                }
                let id = builder.build().unwrap();
                // Generated ids may collide within a group; keep the first.
                let taken = out
                    .group(&GroupId::from(name.as_str()))
                    .is_some_and(|group| group.find(&id).is_some());
                if taken {
                    continue;
                }
                out.add_iterator(name.as_str(), SeriesIterator::new(id, samples))
                    .unwrap();
            }
        }
        out
    })
}

proptest! {
    #[test]
    fn prop_roundtrip_identity(groups in arb_groups()) {
        let bytes = to_bytes(None, &groups).unwrap();
        let decoded = from_bytes(None, &bytes).unwrap();
        prop_assert_eq!(&decoded, &groups);
        prop_assert_eq!(to_bytes(None, &decoded).unwrap(), bytes);
    }
}
