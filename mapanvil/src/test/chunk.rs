use mapnbt::{Compound, Tag, Value};

use super::builder::{chunk, legacy_chunk, one_block_at_top_corner, section};
use crate::{ChunkDocument, DecodeWarning, Error};

#[test]
fn modern_layout() {
    let root = chunk(
        -3,
        7,
        vec![
            section(-1, &["minecraft:deepslate"], None),
            section(4, &["stone", "air"], Some(one_block_at_top_corner())),
        ],
    );

    let doc = ChunkDocument::from_compound(&root).unwrap();
    assert_eq!((doc.x_pos(), doc.z_pos()), (-3, 7));
    assert_eq!(doc.sections().len(), 2);

    assert_eq!(doc.block(0, 79, 0).unwrap().unwrap().id(), "stone");
    assert_eq!(doc.block(1, 79, 0).unwrap().unwrap().id(), "air");
    assert_eq!(doc.block(0, 64, 0).unwrap().unwrap().id(), "air");
    assert_eq!(doc.block(9, -16, 2).unwrap().unwrap().id(), "deepslate");
    assert_eq!(doc.block(9, -1, 2).unwrap().unwrap().id(), "deepslate");
    assert!(doc.block(0, 100, 0).unwrap().is_none());
    assert!(doc.block(0, -17, 0).unwrap().is_none());
}

#[test]
fn section_for_negative_heights() {
    let root = chunk(0, 0, vec![section(-4, &["bedrock"], None)]);
    let doc = ChunkDocument::from_compound(&root).unwrap();

    assert_eq!(doc.section_for_y(-64).map(|s| s.y()), Some(-4));
    assert_eq!(doc.section_for_y(-49).map(|s| s.y()), Some(-4));
    assert!(doc.section_for_y(-48).is_none());
    assert!(doc.section_for_y(-65).is_none());
}

#[test]
fn legacy_layout() {
    let root = legacy_chunk(
        5,
        6,
        4,
        &["minecraft:stone", "minecraft:air"],
        one_block_at_top_corner(),
    );
    let doc = ChunkDocument::from_compound(&root).unwrap();

    assert_eq!((doc.x_pos(), doc.z_pos()), (5, 6));
    assert_eq!(doc.block(0, 79, 0).unwrap().unwrap().id(), "stone");
    assert_eq!(doc.block(0, 78, 0).unwrap().unwrap().id(), "air");
}

#[test]
fn sections_without_blocks_are_skipped() {
    let mut light_only = Compound::new();
    light_only.insert("Y".to_owned(), Value::Byte(-5));
    light_only.insert("SkyLight".to_owned(), Value::ByteArray(vec![0; 2048]));

    let root = chunk(
        0,
        0,
        vec![Value::Compound(light_only), section(0, &["dirt"], None)],
    );
    let doc = ChunkDocument::from_compound(&root).unwrap();
    assert_eq!(doc.sections().len(), 1);
}

#[test]
fn bad_palette_warns_per_block() {
    let root = chunk(0, 0, vec![section(0, &["stone", "air"], Some(vec![0xF; 256]))]);
    let doc = ChunkDocument::from_compound(&root).unwrap();

    assert_eq!(
        doc.block(0, 0, 0),
        Err(DecodeWarning::PaletteIndexOutOfRange { index: 15, len: 2 })
    );
}

#[test]
fn missing_position_is_format_error() {
    let mut root = Compound::new();
    root.insert("sections".to_owned(), Value::List(Tag::End, vec![]));

    assert!(matches!(
        ChunkDocument::from_compound(&root),
        Err(Error::Format(_))
    ));
}

#[test]
fn data_of_wrong_type_is_format_error() {
    let mut states = Compound::new();
    states.insert(
        "palette".to_owned(),
        Value::List(Tag::Compound, vec![super::builder::block("stone")]),
    );
    states.insert("data".to_owned(), Value::IntArray(vec![1, 2]));

    let mut sec = Compound::new();
    sec.insert("Y".to_owned(), Value::Byte(0));
    sec.insert("block_states".to_owned(), Value::Compound(states));

    let root = chunk(0, 0, vec![Value::Compound(sec)]);
    assert!(matches!(
        ChunkDocument::from_compound(&root),
        Err(Error::Format(_))
    ));
}
