#![no_main]

use athena::doctree;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(nodes) = doctree::parse_hierarchy(text) {
            let _ = doctree::validate(&nodes, doctree::DEFAULT_MAX_DEPTH);
            let _ = doctree::walk(&nodes).count();
        }
    }
});
