#![no_main]
use libfuzzer_sys::fuzz_target;
use minidiff::decoder::{self, ApplyOptions};
use minidiff::text::Indexing;

fuzz_target!(|data: &[u8]| {
    // Split into script and source; neither parsing nor applying may panic.
    let text = String::from_utf8_lossy(data);
    let (script, source) = match text.split_once('\u{0}') {
        Some(parts) => parts,
        None => (text.as_ref(), ""),
    };

    for indexing in [Indexing::Chars, Indexing::Utf16] {
        let strict = decoder::apply_json(
            script,
            source,
            &ApplyOptions::strict().with_indexing(indexing),
        );
        let lenient = decoder::apply_json(
            script,
            source,
            &ApplyOptions::lenient().with_indexing(indexing),
        );
        // Scripts that apply strictly must decode identically when lenient.
        if let Ok(out) = strict {
            assert_eq!(Some(out), lenient.ok());
        }
    }
});
