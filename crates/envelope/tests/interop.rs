use envelope::json::{encode, to_legacy_nested};
use envelope::{
    from_any, from_any_with, from_text, to_text, AdapterConfig, Container, ErrorKind, Format,
    Header, JsonShape, NativeProfile, TypeTag, Value,
};
use proptest::prelude::*;

const PING: &str = "@header={[1,server];[2,handler];[3,client];[4,session];[5,ping];[6,1.0.0.0];};@data={[seq,4,7];};";

const ALL_FORMATS: [Format; 4] = [
    Format::Text,
    Format::Json(JsonShape::Unified),
    Format::Json(JsonShape::LegacyNested),
    Format::Json(JsonShape::LegacyFlat),
];

fn route(message_type: &str) -> Header {
    Header::new(message_type)
        .with_target("server", "handler")
        .with_source("client", "session")
}

fn every_tag() -> Container {
    let mut container = Container::with_header(route("every_tag"));
    let scalars: [(&str, TypeTag, &str); 14] = [
        ("null", TypeTag::Null, ""),
        ("bool", TypeTag::Bool, "false"),
        ("short", TypeTag::Short, "32767"),
        ("ushort", TypeTag::UShort, "0"),
        ("int", TypeTag::Int, "2147483647"),
        ("uint", TypeTag::UInt, "4294967295"),
        ("long", TypeTag::Long, "9223372036854775807"),
        ("ulong", TypeTag::ULong, "18446744073709551615"),
        ("llong", TypeTag::LLong, "-9223372036854775808"),
        ("ullong", TypeTag::ULLong, "18446744073709551615"),
        ("float", TypeTag::Float, "-1.5"),
        ("double", TypeTag::Double, "2.718281828459045"),
        ("bytes", TypeTag::Bytes, "3q2+7w=="),
        ("string", TypeTag::String, "a,b;c[d]e{f}g\\h"),
    ];
    for (name, tag, text) in scalars {
        container.add(Value::from_text(name, tag, text).unwrap());
    }
    container
}

fn three_levels() -> Container {
    let leaf = Container::with_header(Header::new("leaf")).with_value(Value::double("pi", 3.25).unwrap());
    let mut middle = Container::with_header(route("middle"));
    middle.add(Value::string("label", "mid").unwrap());
    middle.add_container("leaf", leaf).unwrap();
    let mut root = every_tag();
    root.add_container("middle", middle).unwrap();
    root
}

#[test]
fn ping_text_is_byte_exact() {
    let ping = Container::with_header(route("ping")).with_value(Value::int("seq", 7).unwrap());
    assert_eq!(to_text(&ping), PING);
    assert_eq!(from_text(PING).unwrap(), ping);
}

#[test]
fn every_format_round_trips_every_tag() {
    let container = every_tag();
    for format in ALL_FORMATS {
        let wire = encode(&container, format, false).unwrap();
        assert_eq!(from_any(wire.as_bytes()).unwrap(), container, "{format}");
    }
}

#[test]
fn nested_containers_round_trip_in_every_format() {
    let container = three_levels();
    assert_eq!(container.depth(), 2);
    for format in ALL_FORMATS {
        let wire = encode(&container, format, true).unwrap();
        let decoded = from_any(wire.as_bytes()).unwrap();
        assert_eq!(decoded, container, "{format}");
        let leaf = decoded
            .get("middle")
            .unwrap()
            .as_container()
            .unwrap()
            .get("leaf")
            .unwrap()
            .as_container()
            .unwrap();
        assert_eq!(leaf.header.message_type, "leaf");
    }
}

#[test]
fn cross_format_conversion_is_lossless() {
    let original = three_levels();
    for from in ALL_FORMATS {
        let first = encode(&original, from, false).unwrap();
        for to in ALL_FORMATS {
            let converted = envelope::convert(first.as_bytes(), to, &AdapterConfig::default()).unwrap();
            assert_eq!(from_any(converted.as_bytes()).unwrap(), original, "{from} -> {to}");
        }
    }
}

#[test]
fn duplicate_names_keep_order_and_last_wins() {
    let container = Container::new()
        .with_value(Value::int("n", 1).unwrap())
        .with_value(Value::string("other", "x").unwrap())
        .with_value(Value::int("n", 2).unwrap());
    assert_eq!(container.get("n").unwrap().as_integer(), Some(2));
    assert_eq!(container.get_all("n").count(), 2);

    for format in [Format::Text, Format::Json(JsonShape::Unified), Format::Json(JsonShape::LegacyFlat)] {
        let wire = encode(&container, format, false).unwrap();
        assert_eq!(from_any(wire.as_bytes()).unwrap(), container, "{format}");
    }
    assert_eq!(to_legacy_nested(&container).values.len(), 2);
}

#[test]
fn minimal_consumer_forwards_without_losing_tags() {
    let original = every_tag();
    let unified = encode(&original, Format::Json(JsonShape::Unified), false).unwrap();

    let mut minimal = AdapterConfig::default();
    minimal.json.profile = NativeProfile::Minimal;
    let widened = from_any_with(unified.as_bytes(), &minimal);

    // ULONG/ULLONG at u64::MAX cannot be represented as LONG.
    assert_eq!(widened.unwrap_err().kind(), ErrorKind::ValueOutOfRange);

    let mut fits = Container::with_header(route("fits"));
    for value in original.iter() {
        if matches!(value.tag(), TypeTag::ULong | TypeTag::ULLong) {
            continue;
        }
        fits.add(value.clone());
    }
    fits.add(Value::from_text("ulong", TypeTag::ULong, "9223372036854775807").unwrap());
    let unified = encode(&fits, Format::Json(JsonShape::Unified), false).unwrap();
    let widened = from_any_with(unified.as_bytes(), &minimal).unwrap();

    for (value, tag) in [("short", TypeTag::Int), ("uint", TypeTag::Long), ("ulong", TypeTag::Long)] {
        let value = widened.get(value).unwrap();
        assert_eq!(value.tag(), tag);
        assert!(value.is_widened());
    }
    assert_eq!(widened.get("string").unwrap().provenance(), None);

    let forwarded = encode(&widened, Format::Json(JsonShape::Unified), false).unwrap();
    assert_eq!(from_any(forwarded.as_bytes()).unwrap(), fits);
}

#[test]
fn minimal_consumer_sees_every_format_alike() {
    let mut child = Container::with_header(route("child"));
    child.add(Value::from_text("ushort", TypeTag::UShort, "65535").unwrap());
    let mut container = Container::with_header(route("narrow"));
    container.add(Value::from_text("short", TypeTag::Short, "-32768").unwrap());
    container.add(Value::from_text("llong", TypeTag::LLong, "-1").unwrap());
    container.add(Value::string("label", "x").unwrap());
    container.add_container("child", child).unwrap();

    let mut minimal = AdapterConfig::default();
    minimal.json.profile = NativeProfile::Minimal;
    let decoded: Vec<Container> = ALL_FORMATS
        .iter()
        .map(|&format| {
            let wire = encode(&container, format, false).unwrap();
            from_any_with(wire.as_bytes(), &minimal).unwrap()
        })
        .collect();

    for (format, other) in ALL_FORMATS.iter().zip(&decoded) {
        assert_eq!(other, &decoded[0], "{format}");
    }
    let short = decoded[0].get("short").unwrap();
    assert_eq!((short.tag(), short.provenance()), (TypeTag::Int, Some(TypeTag::Short)));
    let nested = decoded[0].get("child").unwrap().as_container().unwrap();
    assert_eq!(nested.get("ushort").unwrap().tag(), TypeTag::Int);
}

#[test]
fn missing_trailing_semicolon_is_malformed_entry() {
    let err = from_any(PING.trim_end_matches(';').as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedEntry);
}

#[test]
fn json_type_outside_registry_is_unknown_tag() {
    let unified = encode(&every_tag(), Format::Json(JsonShape::Unified), false).unwrap();
    let broken = unified.replacen(r#""type":13,"type_name":"string""#, r#""type":15"#, 1);
    assert_ne!(broken, unified);
    let err = from_any(broken.as_bytes()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTypeTag);
}

fn nest(levels: usize) -> Container {
    let mut container = Container::with_header(Header::new("bottom"));
    for _ in 0..levels {
        let mut parent = Container::with_header(Header::new("wrap"));
        parent.add_container("inner", container).unwrap();
        container = parent;
    }
    container
}

#[test]
fn nesting_beyond_max_depth_is_rejected_in_every_format() {
    let config = AdapterConfig::default();
    let deep = nest(config.text.max_depth + 10);
    for format in ALL_FORMATS {
        let wire = encode(&deep, format, false).unwrap();
        let err = from_any_with(wire.as_bytes(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded, "{format}");
    }

    let at_limit = nest(config.text.max_depth);
    for format in ALL_FORMATS {
        let wire = encode(&at_limit, format, false).unwrap();
        assert!(from_any_with(wire.as_bytes(), &config).is_ok(), "{format}");
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let name = "[a-z][a-z0-9_,;\\[\\]{}]{0,8}";
    prop_oneof![
        (name, any::<bool>()).prop_map(|(n, v)| Value::bool(n, v).unwrap()),
        (name, any::<i16>()).prop_map(|(n, v)| Value::integer(n, TypeTag::Short, v.into()).unwrap()),
        (name, any::<u32>()).prop_map(|(n, v)| Value::integer(n, TypeTag::UInt, v.into()).unwrap()),
        (name, any::<u64>()).prop_map(|(n, v)| Value::integer(n, TypeTag::ULLong, v.into()).unwrap()),
        (name, any::<f64>().prop_filter("finite", |v| v.is_finite()))
            .prop_map(|(n, v)| Value::double(n, v).unwrap()),
        (name, proptest::collection::vec(any::<u8>(), 0..32))
            .prop_map(|(n, v)| Value::bytes(n, v).unwrap()),
        (name, "\\PC{0,24}").prop_map(|(n, v)| Value::string(n, v).unwrap()),
    ]
}

proptest! {
    #[test]
    fn arbitrary_containers_survive_every_format(values in proptest::collection::vec(arb_value(), 0..12)) {
        let mut container = Container::with_header(route("prop"));
        for value in values {
            container.add(value);
        }
        for format in [Format::Text, Format::Json(JsonShape::Unified), Format::Json(JsonShape::LegacyFlat)] {
            let wire = encode(&container, format, false).unwrap();
            prop_assert_eq!(&from_any(wire.as_bytes()).unwrap(), &container);
        }
    }
}
