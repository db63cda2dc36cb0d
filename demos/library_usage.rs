use minidiff::{ApplyOptions, Indexing, apply_json};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let source = "The quick brown fox jumps over the lazy dog";
    let script = r#"["cat", [0, 16], 3, [0, 24]]"#;

    let target = apply_json(script, source, &ApplyOptions::default())?;
    assert_eq!(target, "The quick brown cat jumps over the lazy dog");
    println!("{target}");

    // Out-of-range copies fail in strict mode and clamp in lenient mode.
    let overrun = r#"["", [-3, 8]]"#;
    match apply_json(overrun, "abcdef", &ApplyOptions::strict()) {
        Ok(out) => println!("strict: {out}"),
        Err(e) => println!("strict: {e}"),
    }
    println!("lenient: {}", apply_json(overrun, "abcdef", &ApplyOptions::lenient())?);

    let utf16 = ApplyOptions::default().with_indexing(Indexing::Utf16);
    println!("utf16: {}", apply_json(r#"["!", [0, 3], 1]"#, "😀ab", &utf16)?);
    Ok(())
}
