use crate::{Error, RegionFile};


mod chunk;
mod region;


#[test]
fn errors_know_their_scope() {
    assert!(Error::UnsupportedCompression.is_chunk_local());
    assert!(Error::ChunkOutOfBounds { x: 1, z: 2 }.is_chunk_local());
    assert!(Error::Format("bad".to_owned()).is_chunk_local());
    assert!(!Error::TruncatedRegion(10).is_chunk_local());
    assert!(!Error::InvalidRegionSize(0).is_chunk_local());

    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(!Error::from(io).is_chunk_local());
}

#[test]
fn region_is_send_and_sync() {
    fn check<T: Send + Sync>() {}
    check::<RegionFile>();
    check::<crate::ColorResolver>();
}
