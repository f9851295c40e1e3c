#![no_main]

use athena::compression::{compress_lz77, decompress_lz77};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decompress_lz77(data);

    if data.len() < 0x10000 {
        for extended in [false, true] {
            let packed = compress_lz77(data, extended);
            assert_eq!(decompress_lz77(&packed).ok().as_deref(), Some(data));
        }
    }
});
