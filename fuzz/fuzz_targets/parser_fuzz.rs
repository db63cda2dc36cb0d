#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Treat the input as an argv: NUL or whitespace separated, capped.
    let text = String::from_utf8_lossy(data);
    let args: Vec<String> = text
        .split(|c: char| c == '\u{0}' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .take(32)
        .map(str::to_owned)
        .collect();
    minidiff::cli::fuzz_try_parse_args(&args);
});
