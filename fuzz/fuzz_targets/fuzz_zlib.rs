#![no_main]

use athena::compression::decompress_zlib;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decompress_zlib(data, None);
    // A declared size must bound the output
    if let Ok(plain) = decompress_zlib(data, Some(64)) {
        assert!(plain.len() <= 64);
    }
});
