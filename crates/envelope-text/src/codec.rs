use bytes::{BufMut, BytesMut};
use envelope_core::{Container, EnvelopeError, Header, Result, DEFAULT_MAX_DEPTH};
use tracing::{debug, trace};

use crate::escape::escape_into;
use crate::parser::Parser;

/// Opening of the header section.
pub const HEADER_OPEN: &str = "@header={";

/// Opening of the data section.
pub const DATA_OPEN: &str = "@data={";

/// Number of positional header fields.
pub const HEADER_FIELDS: usize = 6;

/// Configuration for the text codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextConfig {
    /// Maximum container nesting accepted on decode. Default: 32.
    pub max_depth: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Encode a container into the text wire format.
///
/// Wire format:
/// ```text
/// @header={[1,target_id];[2,target_sub_id];[3,source_id];[4,source_sub_id];[5,message_type];[6,version];};
/// @data={[name,type,data];[name,type,data];};
/// ```
/// (a single line; the break above is for readability). Output is
/// deterministic and follows append order. Provenance is not carried.
pub fn encode_text(container: &Container, dst: &mut BytesMut) {
    let text = to_text(container);
    dst.reserve(text.len());
    dst.put_slice(text.as_bytes());
}

/// Encode a container into a new string.
pub fn to_text(container: &Container) -> String {
    let mut out = String::with_capacity(128);
    write_container(container, &mut out);
    out
}

fn write_container(container: &Container, out: &mut String) {
    out.push_str(HEADER_OPEN);
    for (index, field) in header_fields(&container.header).iter().enumerate() {
        out.push('[');
        out.push_str(&(index + 1).to_string());
        out.push(',');
        escape_into(field, out);
        out.push_str("];");
    }
    out.push_str("};");

    out.push_str(DATA_OPEN);
    for value in container {
        out.push('[');
        escape_into(value.name(), out);
        out.push(',');
        out.push_str(&value.tag().id().to_string());
        out.push(',');
        if let Some(child) = value.as_container() {
            write_container(child, out);
        } else if let Some(text) = value.to_text() {
            escape_into(&text, out);
        }
        out.push_str("];");
    }
    out.push_str("};");
}

fn header_fields(header: &Header) -> [&str; HEADER_FIELDS] {
    [
        &header.target_id,
        &header.target_sub_id,
        &header.source_id,
        &header.source_sub_id,
        &header.message_type,
        &header.version,
    ]
}

/// Decode a container from the text wire format.
///
/// Decoding is all-or-nothing. Every error carries the byte offset where the
/// scan stopped.
pub fn decode_text(src: &[u8], config: &TextConfig) -> Result<Container> {
    trace!(len = src.len(), max_depth = config.max_depth, "decoding text container");

    if let Err(err) = std::str::from_utf8(src) {
        return Err(EnvelopeError::InvalidUtf8(err.to_string()).at_offset(err.valid_up_to()));
    }

    let result = Parser::new(src, config.max_depth).parse();
    if let Err(err) = &result {
        debug!(error = %err, "text decode failed");
    }
    result
}

/// Decode a container from a string with default configuration.
pub fn from_text(text: &str) -> Result<Container> {
    decode_text(text.as_bytes(), &TextConfig::default())
}

/// Returns true if `src` looks like a text-format document.
pub fn is_text_format(src: &[u8]) -> bool {
    src.trim_ascii_start().starts_with(HEADER_OPEN.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use envelope_core::{ErrorKind, Location, Payload, TypeTag, Value};

    const PROFILE: &str = "@header={[1,server];[2,handler];[3,client];[4,session];[5,user_profile];[6,1.0.0.0];};@data={[username,13,alice];[age,4,25];};";

    fn route(message_type: &str) -> Header {
        Header::new(message_type)
            .with_target("server", "handler")
            .with_source("client", "session")
    }

    fn ping() -> Container {
        Container::with_header(route("ping")).with_value(Value::int("seq", 7).unwrap())
    }

    #[test]
    fn ping_byte_matches() {
        let expected = "@header={[1,server];[2,handler];[3,client];[4,session];[5,ping];[6,1.0.0.0];};@data={[seq,4,7];};";
        assert_eq!(to_text(&ping()), expected);
        assert_eq!(from_text(expected).unwrap(), ping());
    }

    #[test]
    fn decodes_profile_example() {
        let container = from_text(PROFILE).unwrap();
        assert_eq!(container.header, route("user_profile"));
        assert_eq!(container.get("username").unwrap().as_str(), Some("alice"));
        assert_eq!(container.get("age").unwrap().payload(), &Payload::Int(25));
        assert_eq!(to_text(&container), PROFILE);
    }

    #[test]
    fn tolerates_line_break_between_sections() {
        let split = PROFILE.replacen("};@data", "};\n@data", 1);
        assert_eq!(from_text(&split).unwrap(), from_text(PROFILE).unwrap());
        assert!(from_text(&format!("  {PROFILE}\n")).is_ok());
    }

    #[test]
    fn encode_into_buffer() {
        let mut buf = BytesMut::new();
        encode_text(&ping(), &mut buf);
        assert_eq!(buf.as_ref(), to_text(&ping()).as_bytes());
    }

    #[test]
    fn encode_is_deterministic() {
        let container = Container::with_header(route("m"))
            .with_value(Value::string("z", "last").unwrap())
            .with_value(Value::int("a", 1).unwrap());
        let first = to_text(&container);
        assert_eq!(first, to_text(&container));
        assert!(first.find("[z,").unwrap() < first.find("[a,").unwrap());
    }

    #[test]
    fn every_tag_round_trips_at_boundaries() {
        let mut container = Container::with_header(route("boundaries"));
        let mut add = |value: Value| container.add(value);

        add(Value::null("null").unwrap());
        add(Value::bool("yes", true).unwrap());
        add(Value::bool("no", false).unwrap());
        for (tag, min, max, typical) in [
            (TypeTag::Short, i16::MIN as i128, i16::MAX as i128, 123),
            (TypeTag::UShort, 0, u16::MAX as i128, 123),
            (TypeTag::Int, i32::MIN as i128, i32::MAX as i128, -42),
            (TypeTag::UInt, 0, u32::MAX as i128, 42),
            (TypeTag::Long, i64::MIN as i128, i64::MAX as i128, -9_000_000_000),
            (TypeTag::ULong, 0, u64::MAX as i128, 9_000_000_000),
            (TypeTag::LLong, i64::MIN as i128, i64::MAX as i128, 1),
            (TypeTag::ULLong, 0, u64::MAX as i128, 1),
        ] {
            for (suffix, value) in [("min", min), ("max", max), ("zero", 0), ("typ", typical)] {
                add(Value::integer(format!("{tag}_{suffix}"), tag, value).unwrap());
            }
        }
        for v in [f32::MIN, f32::MAX, 0.0, 3.25, f32::EPSILON] {
            add(Value::new("float", Payload::Float(v)).unwrap());
        }
        for v in [f64::MIN, f64::MAX, 0.0, -2.5e-300, 0.1] {
            add(Value::double("double", v).unwrap());
        }
        add(Value::bytes("empty_bytes", Vec::new()).unwrap());
        add(Value::bytes("bytes", vec![0u8, 1, 2, 254, 255]).unwrap());
        add(Value::string("empty_string", "").unwrap());
        add(Value::string("string", "héllo, [world]; {x} \\ y").unwrap());

        let decoded = from_text(&to_text(&container)).unwrap();
        assert_eq!(decoded, container);
    }

    #[test]
    fn escaped_names_and_header_fields_round_trip() {
        let header = route("a;b").with_version("1,0");
        let container =
            Container::with_header(header).with_value(Value::string("k[0]", "v").unwrap());
        let text = to_text(&container);
        assert!(text.contains(r"[5,a\;b]"));
        assert_eq!(from_text(&text).unwrap(), container);
    }

    #[test]
    fn nested_containers_round_trip_three_levels() {
        let level3 = Container::with_header(route("level3"))
            .with_value(Value::string("leaf", "deep").unwrap());
        let mut level2 = Container::with_header(route("level2"));
        level2.add_container("level3", level3).unwrap();
        level2.add(Value::int("n", 2).unwrap());
        let mut level1 = Container::with_header(route("level1"));
        level1.add_container("level2", level2).unwrap();
        let mut root = Container::with_header(route("root"));
        root.add_container("level1", level1).unwrap();
        root.add(Value::int("after", 1).unwrap());

        let text = to_text(&root);
        let decoded = from_text(&text).unwrap();
        assert_eq!(decoded, root);
        assert_eq!(decoded.depth(), 3);

        let leaf = decoded
            .get("level1")
            .and_then(|v| v.as_container().unwrap().get("level2"))
            .and_then(|v| v.as_container().unwrap().get("level3"))
            .unwrap()
            .as_container()
            .unwrap();
        assert_eq!(leaf.header.message_type, "level3");
        assert_eq!(leaf.get("leaf").unwrap().as_str(), Some("deep"));
    }

    #[test]
    fn nested_data_block_without_header_decodes() {
        let text = "@header={[1,a];[2,b];[3,c];[4,d];[5,outer];[6,1.0.0.0];};@data={[child,14,@data={[x,4,1];[inner,14,@data={};];};];[after,4,2];};";
        let decoded = from_text(text).unwrap();
        let child = decoded.get("child").unwrap().as_container().unwrap();
        assert_eq!(child.header, Header::default());
        assert_eq!(child.get("x").unwrap().payload(), &Payload::Int(1));
        assert!(child.get("inner").unwrap().as_container().unwrap().is_empty());
        assert_eq!(decoded.get("after").unwrap().payload(), &Payload::Int(2));
        assert_eq!(decoded.depth(), 2);

        // The root still needs its header.
        let err = from_text("@data={[x,4,1];};").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn unescaped_braces_inside_fields_decode() {
        let text = "@header={[1,a];[2,b];[3,c];[4,d];[5,e{x}];[6,f];};@data={[s,13,a{b}];[t{,13,}];};";
        let decoded = from_text(text).unwrap();
        assert_eq!(decoded.header.message_type, "e{x}");
        assert_eq!(decoded.get("s").unwrap().as_str(), Some("a{b}"));
        assert_eq!(decoded.get("t{").unwrap().as_str(), Some("}"));

        // Encoding still escapes them, and both spellings decode alike.
        let encoded = to_text(&decoded);
        assert!(encoded.contains(r"[s,13,a\{b\}];"));
        assert_eq!(from_text(&encoded).unwrap(), decoded);
    }

    #[test]
    fn missing_trailing_semicolon_is_malformed_entry() {
        let text = PROFILE.strip_suffix(';').unwrap();
        let err = from_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedEntry);
        assert_eq!(err.location(), Some(&Location::Offset(text.len())));
    }

    #[test]
    fn short_header_is_malformed() {
        let text = "@header={[1,server];[2,handler];[3,client];};@data={};";
        let err = from_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedHeader);
    }

    #[test]
    fn header_rejections() {
        let cases = [
            "@header={[2,a];[1,b];[3,c];[4,d];[5,e];[6,f];};@data={};",
            "@header={[1,a];[2,b];[3,c];[4,d];[5,e];[6,f];[7,g];};@data={};",
            "@header={[1,a];[2,b];[3,c];[4,d];[5,e];[6,f]};@data={};",
            "@header={[1,a,x];[2,b];[3,c];[4,d];[5,e];[6,f];};@data={};",
            "@heder={};@data={};",
        ];
        for text in cases {
            let err = from_text(text).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedHeader, "{text}");
        }
    }

    #[test]
    fn entry_rejections_report_offsets() {
        let header = "@header={[1,a];[2,b];[3,c];[4,d];[5,e];[6,f];};";
        let cases = [
            ("@data={[x,4,1,2];};", ErrorKind::MalformedEntry),
            ("@data={[x,int,1];};", ErrorKind::MalformedEntry),
            ("@data={[x,15,1];};", ErrorKind::UnknownTypeTag),
            ("@data={[x,4,1]};", ErrorKind::MalformedEntry),
            ("@data={[x,4,1];", ErrorKind::MalformedEntry),
            ("@data={[x;y,4,1];};", ErrorKind::MalformedEntry),
            ("@data={[x,13,a\\qb];};", ErrorKind::MalformedEntry),
            ("@data={[x,4];};", ErrorKind::MalformedEntry),
            ("@data={[x,2,70000];};", ErrorKind::ValueOutOfRange),
            ("@data={[x,12,%%%];};", ErrorKind::InvalidBase64),
            ("@data={[,4,1];};", ErrorKind::EmptyName),
            ("@data={[x,4,1];};junk", ErrorKind::MalformedEntry),
        ];
        for (data, kind) in cases {
            let text = format!("{header}{data}");
            let err = from_text(&text).unwrap_err();
            assert_eq!(err.kind(), kind, "{text}");
            match err.location() {
                Some(Location::Offset(offset)) => assert!(*offset >= header.len(), "{text}"),
                other => panic!("expected offset for {text}, got {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_tag_offset_points_at_type() {
        let text = "@header={[1,a];[2,b];[3,c];[4,d];[5,e];[6,f];};@data={[x,99,1];};";
        let err = from_text(text).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTypeTag);
        assert_eq!(err.location(), Some(&Location::Offset(text.find("99").unwrap())));
    }

    #[test]
    fn invalid_utf8_is_rejected_with_offset() {
        let mut bytes = PROFILE.as_bytes().to_vec();
        let at = PROFILE.find("alice").unwrap();
        bytes[at] = 0xff;
        let err = decode_text(&bytes, &TextConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8);
        assert_eq!(err.location(), Some(&Location::Offset(at)));
    }

    fn nested(levels: usize) -> Container {
        let mut current = Container::new().with_value(Value::int("leaf", 0).unwrap());
        for _ in 0..levels {
            let mut parent = Container::new();
            parent.add_container("child", current).unwrap();
            current = parent;
        }
        current
    }

    #[test]
    fn depth_limit_is_enforced() {
        let config = TextConfig::default();
        let text = to_text(&nested(config.max_depth + 10));
        let err = decode_text(text.as_bytes(), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxDepthExceeded);

        let at_limit = to_text(&nested(config.max_depth));
        assert!(decode_text(at_limit.as_bytes(), &config).is_ok());
    }

    #[test]
    fn custom_depth_limit() {
        let config = TextConfig { max_depth: 1 };
        assert!(decode_text(to_text(&nested(1)).as_bytes(), &config).is_ok());
        let err = decode_text(to_text(&nested(2)).as_bytes(), &config).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::Located { ref source, .. }
                if matches!(**source, EnvelopeError::MaxDepthExceeded { max: 1 })
        ));
    }

    #[test]
    fn sniffing() {
        assert!(is_text_format(PROFILE.as_bytes()));
        assert!(is_text_format(b"\n  @header={"));
        assert!(!is_text_format(br#"{"header":{}}"#));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn arbitrary_strings_round_trip(name in "[^\\x00]{1,16}", data in any::<String>()) {
                let container = Container::with_header(route("prop"))
                    .with_value(Value::string(name, data).unwrap());
                let decoded = from_text(&to_text(&container)).unwrap();
                prop_assert_eq!(decoded, container);
            }

            #[test]
            fn arbitrary_integers_round_trip(short in any::<i16>(), ulong in any::<u64>(), llong in any::<i64>()) {
                let container = Container::new()
                    .with_value(Value::new("s", Payload::Short(short)).unwrap())
                    .with_value(Value::new("u", Payload::ULong(ulong)).unwrap())
                    .with_value(Value::new("l", Payload::LLong(llong)).unwrap());
                let decoded = from_text(&to_text(&container)).unwrap();
                prop_assert_eq!(decoded, container);
            }

            #[test]
            fn arbitrary_bytes_round_trip(data in proptest::collection::vec(any::<u8>(), 0..64)) {
                let container = Container::new().with_value(Value::bytes("b", data).unwrap());
                let decoded = from_text(&to_text(&container)).unwrap();
                prop_assert_eq!(decoded, container);
            }
        }
    }
}
