#![no_main]

use athena::compression::{yaz0_compress, yaz0_decompress};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must never panic the decoder
    let _ = yaz0_decompress(data);

    let packed = yaz0_compress(data);
    assert_eq!(yaz0_decompress(&packed).ok().as_deref(), Some(data));
});
