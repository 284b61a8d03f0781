#![no_main]
use libfuzzer_sys::fuzz_target;

use mapanvil::{scan_chunk, RegionFile};

fuzz_target!(|data: Vec<u8>| {
    if let Ok(region) = RegionFile::from_bytes(data) {
        for (x, z) in region.populated_chunks(2) {
            if let Ok(Some(chunk)) = region.chunk(x, z) {
                scan_chunk(&chunk, 1);
            }
        }
    }
});
