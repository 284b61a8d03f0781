use std::io::Write;

use mapnbt::Value;

use super::builder::{stone_corner_chunk, RegionBuilder};
use crate::{ChunkLocation, Error, RegionFile, REGION_HEADER_SIZE};

#[test]
fn empty_region_has_no_chunks() {
    let r = RegionBuilder::new().region();

    for x in 0..32 {
        for z in 0..32 {
            assert!(!r.chunk_exists(x, z));
            assert!(matches!(r.chunk_data(x, z), Ok(None)));
        }
    }
    assert!(r.populated_chunks(32).is_empty());
}

#[test]
fn too_short_for_header() {
    match RegionFile::from_bytes(vec![0; 100]) {
        Err(Error::TruncatedRegion(100)) => {}
        _ => panic!("should error"),
    }
}

#[test]
fn header_only_is_fine() {
    assert!(RegionFile::from_bytes(vec![0; REGION_HEADER_SIZE]).is_ok());
}

#[test]
fn first_location() {
    let r = RegionBuilder::new().location(0, 0, 2, 1).region();
    assert_eq!(
        ChunkLocation {
            offset: 2,
            sectors: 1
        },
        r.location(0, 0)
    );
}

#[test]
fn location_index_wraps() {
    let r = RegionBuilder::new().location(3, 5, 2, 1).region();

    assert!(r.chunk_exists(3, 5));
    assert!(r.chunk_exists(35, 37));
    assert!(!r.chunk_exists(5, 3));
}

#[test]
fn exists_only_with_offset_and_sectors() {
    let r = RegionBuilder::new()
        .location(1, 0, 0, 1)
        .location(2, 0, 7, 0)
        .location(3, 0, 7, 2)
        .region();

    assert!(!r.chunk_exists(0, 0));
    assert!(!r.chunk_exists(1, 0));
    assert!(!r.chunk_exists(2, 0));
    assert!(r.chunk_exists(3, 0));

    assert!(!r.location(2, 0).is_present());
    assert!(!r.location(2, 0).is_empty());
}

#[test]
fn half_written_entries_are_not_populated() {
    let r = RegionBuilder::new()
        .location(0, 0, 2, 1)
        .location(1, 0, 0, 1)
        .location(0, 1, 7, 0)
        .location(1, 1, 3, 1)
        .region();

    assert_eq!(r.populated_chunks(2), vec![(0, 0), (1, 1)]);
}

#[test]
fn populated_chunks_respects_size() {
    let r = RegionBuilder::new()
        .location(0, 0, 2, 1)
        .location(1, 1, 3, 1)
        .location(5, 0, 4, 1)
        .region();

    assert_eq!(r.populated_chunks(2), vec![(0, 0), (1, 1)]);
    assert_eq!(r.populated_chunks(32), vec![(0, 0), (5, 0), (1, 1)]);
}

#[test]
fn invalid_offset() {
    let r = RegionBuilder::new().region();
    assert!(matches!(r.chunk_data(32, 0), Err(Error::InvalidOffset(32, 0))));
    assert!(matches!(r.chunk_data(0, 32), Err(Error::InvalidOffset(0, 32))));
}

#[test]
fn zlib_chunk_decodes() {
    let r = RegionBuilder::new()
        .chunk(4, 9, &stone_corner_chunk(4, 9))
        .region();

    let root = r.chunk_data(4, 9).unwrap().unwrap();
    assert_eq!(root.get("xPos"), Some(&Value::Int(4)));

    let chunk = r.chunk(4, 9).unwrap().unwrap();
    assert_eq!((chunk.x_pos(), chunk.z_pos()), (4, 9));
    assert_eq!(chunk.sections().len(), 1);
}

#[test]
fn gzip_chunk_is_unsupported() {
    let r = RegionBuilder::new()
        .raw_chunk(0, 0, 1, &[0x1f, 0x8b, 0, 0])
        .region();
    assert!(matches!(
        r.chunk_data(0, 0),
        Err(Error::UnsupportedCompression)
    ));
}

#[test]
fn unknown_compression() {
    let r = RegionBuilder::new().raw_chunk(0, 0, 7, &[1, 2, 3]).region();
    assert!(matches!(
        r.chunk_data(0, 0),
        Err(Error::UnknownCompression(7))
    ));
}

#[test]
fn offset_beyond_data_given() {
    let r = RegionBuilder::new().location(1, 0, 10, 1).region();
    match r.chunk_data(1, 0) {
        Err(Error::ChunkOutOfBounds { x: 1, z: 0 }) => {}
        o => panic!("should error {:?}", o.map(|_| ())),
    }
}

#[test]
fn length_beyond_data_given() {
    let mut data = RegionBuilder::new().raw_chunk(0, 0, 2, &[0x78]).build();
    let start = REGION_HEADER_SIZE;
    data[start..start + 4].copy_from_slice(&100_000i32.to_be_bytes());

    let r = RegionFile::from_bytes(data).unwrap();
    assert!(matches!(
        r.chunk_data(0, 0),
        Err(Error::ChunkOutOfBounds { .. })
    ));
}

#[test]
fn corrupt_zlib_is_nbt_error() {
    let r = RegionBuilder::new()
        .raw_chunk(0, 0, 2, &[0x78, 0x9c, 1, 2, 3, 4])
        .region();

    let err = r.chunk_data(0, 0).unwrap_err();
    assert!(matches!(err, Error::Nbt(_)));
    assert!(err.is_chunk_local());
}

#[test]
fn non_chunk_nbt_is_format_error() {
    let mut root = mapnbt::Compound::new();
    root.insert("hello".to_owned(), "world".into());

    let r = RegionBuilder::new().chunk(0, 0, &root).region();
    assert!(matches!(r.chunk(0, 0), Err(Error::Format(_))));
}

#[test]
fn open_reads_file() {
    let bytes = RegionBuilder::new()
        .chunk(2, 3, &stone_corner_chunk(2, 3))
        .build();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let r = RegionFile::open(file.path()).unwrap();
    assert!(r.chunk_exists(2, 3));
    assert!(r.chunk(2, 3).unwrap().is_some());
    assert_eq!(r.into_inner(), bytes);
}

#[test]
fn open_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let res = RegionFile::open(dir.path().join("r.0.0.mca"));
    assert!(matches!(res, Err(Error::Io(_))));
}
