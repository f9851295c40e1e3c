#![no_main]

use athena::formats::ZQuestFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(file) = ZQuestFile::from_bytes(data) {
        // Anything that parsed must serialize again
        let _ = file.to_bytes(false);
    }
});
