#![no_main]

use athena::formats::SpriteFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(file) = SpriteFile::from_bytes(data) {
        let _ = file.to_bytes();
    }
});
