#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = mapnbt::decode(data) {
        // Compare bytes rather than values, NaN floats are never equal. Key
        // order is stable since compounds keep insertion order here.
        let bytes = mapnbt::to_bytes(&root).unwrap();
        let again = mapnbt::decode(&bytes).unwrap();
        assert_eq!(mapnbt::to_bytes(&again).unwrap(), bytes);
    }
});
