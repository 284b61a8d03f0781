use std::io::Write;

use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;

use super::builder::Builder;
use crate::error::{ErrorKind, Result};
use crate::{decode, decode_named, Decoder, Framing, Tag, Value};

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(vec![], Compression::fast());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn zlib(data: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(vec![], Compression::fast());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn kind_of(payload: &[u8]) -> ErrorKind {
    decode(payload).unwrap_err().kind().clone()
}

#[test]
fn error_impls_sync_send() {
    fn i<T: Clone + Send + Sync + std::error::Error>(_: T) {}
    i(crate::error::Error::truncated());
}

#[test]
fn empty_payload() {
    assert_eq!(kind_of(&[]), ErrorKind::TruncatedStream);
}

#[test]
fn empty_root_compound() -> Result<()> {
    let payload = Builder::new().start_compound("").end_compound().build();
    let root = decode(&payload)?;
    assert!(root.is_empty());
    Ok(())
}

#[test]
fn root_name_is_returned() -> Result<()> {
    let payload = Builder::new()
        .start_compound("level")
        .end_compound()
        .build();
    let (name, _) = decode_named(&payload)?;
    assert_eq!(name, "level");
    Ok(())
}

#[test]
fn every_scalar_tag() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .byte("b", -3)
        .short("s", 1234)
        .int("i", 50345)
        .long("l", i32::MAX as i64 + 1)
        .float("f", 1.5)
        .double("d", -2.25)
        .string("str", "hello")
        .end_compound()
        .build();

    let root = decode(&payload)?;

    assert_eq!(root["b"], Value::Byte(-3));
    assert_eq!(root["s"], Value::Short(1234));
    assert_eq!(root["i"], Value::Int(50345));
    assert_eq!(root["l"], Value::Long(i32::MAX as i64 + 1));
    assert_eq!(root["f"], Value::Float(1.5));
    assert_eq!(root["d"], Value::Double(-2.25));
    assert_eq!(root["str"].as_str(), Some("hello"));
    Ok(())
}

#[test]
fn arrays() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .byte_array("bytes", &[1, -1, 3])
        .int_array("ints", &[1, 2, i32::MIN])
        .long_array("longs", &[-1, 0x1111_1111_1111_1110])
        .end_compound()
        .build();

    let root = decode(&payload)?;

    assert_eq!(root["bytes"], Value::ByteArray(vec![1, -1, 3]));
    assert_eq!(root["ints"], Value::IntArray(vec![1, 2, i32::MIN]));
    assert_eq!(
        root["longs"].as_long_array(),
        Some(&[-1, 0x1111_1111_1111_1110][..])
    );
    Ok(())
}

#[test]
fn list_of_compounds_has_no_names() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .start_list("palette", Tag::Compound, 2)
        .string("Name", "minecraft:stone")
        .end_compound()
        .string("Name", "minecraft:air")
        .end_compound()
        .end_compound()
        .build();

    let root = decode(&payload)?;
    let palette = root["palette"].as_list().unwrap();

    assert_eq!(palette.len(), 2);
    let names: Vec<_> = palette
        .iter()
        .map(|p| p.as_compound().unwrap()["Name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["minecraft:stone", "minecraft:air"]);
    Ok(())
}

#[test]
fn empty_list_keeps_element_tag() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .start_list("empty", Tag::End, 0)
        .start_list("ints", Tag::Int, 0)
        .end_compound()
        .build();

    let root = decode(&payload)?;
    assert_eq!(root["empty"], Value::List(Tag::End, vec![]));
    assert_eq!(root["ints"], Value::List(Tag::Int, vec![]));
    Ok(())
}

#[test]
fn nested_lists() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .start_list("outer", Tag::List, 2)
        .tag(Tag::Int)
        .int_payload(1)
        .int_payload(7)
        .tag(Tag::End)
        .int_payload(0)
        .end_compound()
        .build();

    let root = decode(&payload)?;
    assert_eq!(
        root["outer"],
        Value::List(
            Tag::List,
            vec![
                Value::List(Tag::Int, vec![Value::Int(7)]),
                Value::List(Tag::End, vec![]),
            ]
        )
    );
    Ok(())
}

#[test]
fn root_must_be_compound() {
    let payload = Builder::new().int("x", 1).build();
    assert_eq!(kind_of(&payload), ErrorKind::ExpectedCompoundRoot);
}

#[test]
fn unknown_tag_in_compound() {
    let payload = Builder::new()
        .start_compound("")
        .raw_bytes(&[13, 0, 1, b'a'])
        .end_compound()
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::UnknownTagType(13));
}

#[test]
fn unknown_list_element_tag() {
    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::List)
        .name("l")
        .raw_bytes(&[200])
        .int_payload(1)
        .end_compound()
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::UnknownTagType(200));
}

#[test]
fn truncated_mid_value() {
    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::Long)
        .name("l")
        .raw_bytes(&[0, 0, 0])
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::TruncatedStream);
}

#[test]
fn missing_end_tag_is_truncated() {
    let payload = Builder::new().start_compound("").int("a", 1).build();
    assert!(decode(&payload).unwrap_err().is_truncated());
}

#[test]
fn array_longer_than_input_is_truncated() {
    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::LongArray)
        .name("huge")
        .int_payload(i32::MAX)
        .long_payload(1)
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::TruncatedStream);

    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::ByteArray)
        .name("huge")
        .int_payload(i32::MAX)
        .raw_bytes(&[1, 2, 3])
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::TruncatedStream);
}

#[test]
fn negative_array_length() {
    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::IntArray)
        .name("a")
        .int_payload(-5)
        .end_compound()
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::NegativeLength(-5));
}

#[test]
fn list_of_end_with_elements() {
    let payload = Builder::new()
        .start_compound("")
        .start_list("l", Tag::End, 3)
        .end_compound()
        .build();
    assert_eq!(kind_of(&payload), ErrorKind::InvalidList);
}

#[test]
fn nonunicode_name() {
    let payload = Builder::new()
        .start_compound("")
        .tag(Tag::Byte)
        .raw_bytes(&[0, 2, 0xff, 0xfe, 1])
        .end_compound()
        .build();
    assert!(matches!(kind_of(&payload), ErrorKind::Nonunicode(_)));
}

#[test]
fn deep_nesting_is_rejected() {
    let mut builder = Builder::new().start_compound("");
    for _ in 0..crate::de::MAX_DEPTH + 1 {
        builder = builder.start_compound("c");
    }
    assert_eq!(kind_of(&builder.build()), ErrorKind::DepthLimit);
}

#[test]
fn framing_detection() {
    assert_eq!(Framing::detect(&[0x1f, 0x8b, 8]), Framing::Gzip);
    assert_eq!(Framing::detect(&[0x78, 0x9c]), Framing::Zlib);
    assert_eq!(Framing::detect(&[0x78, 0x01]), Framing::Zlib);
    assert_eq!(Framing::detect(&[10, 0, 0]), Framing::Raw);
    assert_eq!(Framing::detect(&[0x1f]), Framing::Raw);
    assert_eq!(Framing::detect(&[]), Framing::Raw);
}

#[test]
fn gzip_and_zlib_decode_the_same() -> Result<()> {
    let payload = Builder::new()
        .start_compound("")
        .int("xPos", -3)
        .string("Status", "minecraft:full")
        .end_compound()
        .build();

    let raw = decode(&payload)?;
    assert_eq!(decode(&gzip(&payload))?, raw);
    assert_eq!(decode(&zlib(&payload))?, raw);
    Ok(())
}

#[test]
fn corrupt_gzip_is_an_error() {
    let mut data = gzip(
        &Builder::new()
            .start_compound("")
            .int("a", 1)
            .end_compound()
            .build(),
    );
    let len = data.len();
    data.truncate(len / 2);
    assert!(decode(&data).is_err());
}

#[test]
fn decoder_leaves_trailing_data() -> Result<()> {
    let mut payload = Builder::new()
        .start_compound("")
        .byte("a", 1)
        .end_compound()
        .build();
    payload.extend_from_slice(&[9, 9]);

    let mut decoder = Decoder::new(payload.as_slice());
    decoder.read_root()?;
    assert_eq!(decoder.into_inner(), &[9, 9]);
    Ok(())
}
