// File-level helpers for applying diff scripts.
//
// Provides `read_script()` and `apply_file()` convenience functions around
// the in-memory decoder.  Scripts, sources and outputs are UTF-8 text files
// read fully into memory.  Optionally computes a SHA-256 checksum of the
// reconstructed output (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "file-io")]
use sha2::Digest;
use thiserror::Error;

use crate::decoder::{self, ApplyError, ApplyOptions};
use crate::script::{DiffScript, ScriptError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `apply_file()`.
#[derive(Debug, Clone)]
pub struct ApplyFileStats {
    /// Source file size in bytes (0 when no source file was given).
    pub source_size: u64,
    /// Script file size in bytes.
    pub script_size: u64,
    /// Reconstructed output size in bytes.
    pub output_size: u64,
    /// Number of operations in the script.
    pub ops: usize,
    /// Operations clamped by lenient mode.
    pub clamped_ops: usize,
    /// SHA-256 of the reconstructed output (if `file-io` feature is enabled).
    pub output_sha256: Option<[u8; 32]>,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum IoError {
    /// I/O error (file open, read, write, invalid UTF-8).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// The script file is not a valid diff script.
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    /// Applying the script failed.
    #[error("apply error: {0}")]
    Apply(#[from] ApplyError),
}

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// read_script / apply_file
// ---------------------------------------------------------------------------

/// Read and parse a JSON diff script file.
pub fn read_script(path: &Path) -> Result<DiffScript, IoError> {
    let text = std::fs::read_to_string(path)?;
    Ok(DiffScript::from_json_str(&text)?)
}

/// Apply the script at `script_path` to the source at `source_path`, writing
/// the reconstructed text to `output_path`.
///
/// A missing `source_path` means an empty source.  Nothing is written when
/// parsing or applying fails.
pub fn apply_file(
    script_path: &Path,
    source_path: Option<&Path>,
    output_path: &Path,
    options: &ApplyOptions,
) -> Result<ApplyFileStats, IoError> {
    let script_text = std::fs::read_to_string(script_path)?;
    let script_size = script_text.len() as u64;
    let script = DiffScript::from_json_str(&script_text)?;

    let source = match source_path {
        Some(path) => std::fs::read_to_string(path)?,
        None => String::new(),
    };
    let source_size = source.len() as u64;

    let (output, stats) = decoder::apply_with_stats(&script, &source, options)?;

    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(output_path)?);
    writer.write_all(output.as_bytes())?;
    writer.flush()?;

    log::debug!(
        "{} -> {}: {} bytes from {} ops",
        script_path.display(),
        output_path.display(),
        output.len(),
        stats.ops
    );

    Ok(ApplyFileStats {
        source_size,
        script_size,
        output_size: output.len() as u64,
        ops: stats.ops,
        clamped_ops: stats.clamped_ops,
        output_sha256: sha256_digest(output.as_bytes()),
    })
}

/// SHA-256 of `data`, or `None` without the `file-io` feature.
#[cfg(feature = "file-io")]
pub fn sha256_digest(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

/// SHA-256 of `data`, or `None` without the `file-io` feature.
#[cfg(not(feature = "file-io"))]
pub fn sha256_digest(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

/// Lowercase hex SHA-256 of `data`, or `None` without the `file-io` feature.
#[cfg(feature = "file-io")]
pub fn sha256_hex(data: &[u8]) -> Option<String> {
    sha256_digest(data).map(hex::encode)
}

/// Lowercase hex SHA-256 of `data`, or `None` without the `file-io` feature.
#[cfg(not(feature = "file-io"))]
pub fn sha256_hex(_data: &[u8]) -> Option<String> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
