#![no_main]
use libfuzzer_sys::fuzz_target;
use minidiff::script::DiffScript;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that parses must survive a trip through the canonical form.
    if let Ok(script) = DiffScript::from_json_str(text) {
        let reparsed = DiffScript::from_json_str(&script.to_json_string())
            .expect("canonical form must parse");
        assert_eq!(reparsed, script);
    }
});
