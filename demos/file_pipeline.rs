use minidiff::ApplyOptions;
use minidiff::io::{apply_file, read_script};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("minidiff-demo-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;

    let source = dir.join("source.txt");
    let script = dir.join("patch.json");
    let output = dir.join("output.txt");
    std::fs::write(&source, "The quick brown fox")?;
    std::fs::write(&script, r#"["very ", [0, 10], 5, [-5, 9]]"#)?;

    let parsed = read_script(&script)?;
    println!("{} ops, output length {}", parsed.ops().len(), parsed.output_len());

    let stats = apply_file(&script, Some(&source), &output, &ApplyOptions::default())?;
    println!("{}", std::fs::read_to_string(&output)?);
    println!(
        "source {} bytes, script {} bytes, output {} bytes",
        stats.source_size, stats.script_size, stats.output_size
    );
    if let Some(digest) = stats.output_sha256 {
        println!("sha256 {}", hex::encode(digest));
    }

    std::fs::remove_dir_all(&dir)?;
    Ok(())
}
