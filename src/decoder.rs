// Diff script decoder: reconstructs a target string from a source string and
// a script of LiteralCopy / SourceCopy operations.
//
// Decoder state is local to one call:
//   - `cursor`     position in the literal pool (advances on LiteralCopy)
//   - `output_len` units emitted so far by all previous operations
//
// A SourceCopy reads `source[offset_delta + output_len ..][..length]`, so a
// zero delta means "source and target are aligned here".  Both counters
// advance by the operation's nominal length, even when lenient mode clamps
// the fragment actually emitted.

use thiserror::Error;

use crate::script::{DiffScript, Op, ScriptError};
use crate::text::{CharView, Indexing, TextUnits, Utf16View};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How out-of-range operations are treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Fail on the first operation whose range leaves the literal pool or
    /// the source.
    #[default]
    Strict,
    /// Clamp ranges to the available text, the way JavaScript's
    /// `String.prototype.substring` does.  Never fails while applying.
    Lenient,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Strict => "strict",
            Mode::Lenient => "lenient",
        }
    }
}

/// Configuration for applying a diff script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    pub mode: Mode,
    /// Unit in which offsets and lengths are counted.
    pub indexing: Indexing,
}

impl ApplyOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn lenient() -> Self {
        Self {
            mode: Mode::Lenient,
            ..Self::default()
        }
    }

    pub fn with_indexing(mut self, indexing: Indexing) -> Self {
        self.indexing = indexing;
        self
    }
}

/// Counters collected while applying a script.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyStats {
    /// Operations executed.
    pub ops: usize,
    /// Units emitted from the literal pool.
    pub literal_units: usize,
    /// Units emitted from the source.
    pub source_units: usize,
    /// Final output length counter (sum of nominal operation lengths).
    pub output_units: usize,
    /// Operations whose range lenient mode had to clamp.
    pub clamped_ops: usize,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to apply a diff script.
///
/// Ranges are reported as computed, before any clamping, in the units chosen
/// by [`ApplyOptions::indexing`].  `op` is the zero-based operation index.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("operation {op}: literal range {start}..{end} exceeds literal pool of {pool_len} units")]
    LiteralPoolExhausted {
        op: usize,
        start: i128,
        end: i128,
        pool_len: usize,
    },

    #[error("operation {op}: source range {start}..{end} lies outside source of {source_len} units")]
    SourceOutOfBounds {
        op: usize,
        start: i128,
        end: i128,
        source_len: usize,
    },

    #[error("unpaired UTF-16 surrogate {unit:#06x} at output unit {position}")]
    InvalidUtf16 { position: usize, unit: u16 },
}

impl ApplyError {
    /// Index of the offending operation, when the error is tied to one.
    pub fn op_index(&self) -> Option<usize> {
        match self {
            Self::Script(ScriptError::MalformedOperation { index, .. }) => Some(*index),
            Self::LiteralPoolExhausted { op, .. } | Self::SourceOutOfBounds { op, .. } => Some(*op),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Apply `script` to `source` in strict mode, counting chars.
///
/// ```
/// use minidiff::decoder::apply;
/// use minidiff::script::DiffScript;
///
/// let script: DiffScript = r#"["XY", 2, [0, 3]]"#.parse().unwrap();
/// assert_eq!(apply(&script, "abcdef").unwrap(), "XYcde");
/// ```
pub fn apply(script: &DiffScript, source: &str) -> Result<String, ApplyError> {
    apply_with_options(script, source, &ApplyOptions::default())
}

/// Apply `script` to `source` with explicit options.
pub fn apply_with_options(
    script: &DiffScript,
    source: &str,
    options: &ApplyOptions,
) -> Result<String, ApplyError> {
    apply_with_stats(script, source, options).map(|(output, _)| output)
}

/// Parse a JSON diff script and apply it to `source`.
pub fn apply_json(
    script_json: &str,
    source: &str,
    options: &ApplyOptions,
) -> Result<String, ApplyError> {
    let script = DiffScript::from_json_str(script_json)?;
    apply_with_options(&script, source, options)
}

/// Apply `script` to `source`, returning the output and the counters.
pub fn apply_with_stats(
    script: &DiffScript,
    source: &str,
    options: &ApplyOptions,
) -> Result<(String, ApplyStats), ApplyError> {
    let (output, stats) = match options.indexing {
        Indexing::Chars => {
            let pool = CharView::new(script.literals());
            let source = CharView::new(source);
            execute(script.ops(), &pool, &source, options.mode)?
        }
        Indexing::Utf16 => {
            let pool = Utf16View::new(script.literals());
            let source = Utf16View::new(source);
            let (units, stats) = execute(script.ops(), &pool, &source, options.mode)?;
            let output = match options.mode {
                Mode::Strict => utf16_to_string(&units)?,
                Mode::Lenient => String::from_utf16_lossy(&units),
            };
            (output, stats)
        }
    };

    log::debug!(
        "applied {} ops ({}, {}): {} literal + {} source units, {} clamped",
        stats.ops,
        options.mode.as_str(),
        options.indexing.as_str(),
        stats.literal_units,
        stats.source_units,
        stats.clamped_ops
    );
    Ok((output, stats))
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

fn execute<T: TextUnits>(
    ops: &[Op],
    pool: &T,
    source: &T,
    mode: Mode,
) -> Result<(T::Buf, ApplyStats), ApplyError> {
    let mut out = T::Buf::default();
    let mut stats = ApplyStats {
        ops: ops.len(),
        ..ApplyStats::default()
    };

    let mut cursor: usize = 0;
    let mut output_len: usize = 0;

    for (index, op) in ops.iter().enumerate() {
        if op.is_noop() {
            log::trace!("op {index}: {op:?} is a no-op");
            continue;
        }

        match *op {
            Op::LiteralCopy { count } => {
                let start = cursor as i128;
                let end = start + count as i128;
                let pool_len = pool.unit_len();
                let Some((lo, hi, clamped)) = resolve_range(start, end, pool_len, mode) else {
                    return Err(ApplyError::LiteralPoolExhausted {
                        op: index,
                        start,
                        end,
                        pool_len,
                    });
                };
                if clamped {
                    stats.clamped_ops += 1;
                    log::debug!("op {index}: literal range {start}..{end} clamped to {lo}..{hi}");
                }
                log::trace!("op {index}: literal {lo}..{hi} at output {output_len}");
                pool.push_range(lo, hi, &mut out);
                stats.literal_units += hi - lo;
                cursor = cursor.saturating_add(count);
                output_len = output_len.saturating_add(count);
            }

            Op::SourceCopy {
                offset_delta,
                length,
            } => {
                let start = offset_delta as i128 + output_len as i128;
                let end = start + length as i128;
                let source_len = source.unit_len();
                let Some((lo, hi, clamped)) = resolve_range(start, end, source_len, mode) else {
                    return Err(ApplyError::SourceOutOfBounds {
                        op: index,
                        start,
                        end,
                        source_len,
                    });
                };
                if clamped {
                    stats.clamped_ops += 1;
                    log::debug!("op {index}: source range {start}..{end} clamped to {lo}..{hi}");
                }
                log::trace!("op {index}: source {lo}..{hi} at output {output_len}");
                source.push_range(lo, hi, &mut out);
                stats.source_units += hi - lo;
                output_len = output_len.saturating_add(length);
            }
        }
    }

    stats.output_units = output_len;
    Ok((out, stats))
}

/// Map a computed range onto `0..len`.
///
/// Returns `(lo, hi, clamped)`, or `None` when strict mode rejects the range.
#[inline]
fn resolve_range(start: i128, end: i128, len: usize, mode: Mode) -> Option<(usize, usize, bool)> {
    let upper = len as i128;
    if start >= 0 && end <= upper {
        return Some((start as usize, end as usize, false));
    }
    match mode {
        Mode::Strict => None,
        Mode::Lenient => Some((
            start.clamp(0, upper) as usize,
            end.clamp(0, upper) as usize,
            true,
        )),
    }
}

fn utf16_to_string(units: &[u16]) -> Result<String, ApplyError> {
    let mut output = String::with_capacity(units.len());
    let mut position = 0usize;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => {
                position += c.len_utf16();
                output.push(c);
            }
            Err(e) => {
                return Err(ApplyError::InvalidUtf16 {
                    position,
                    unit: e.unpaired_surrogate(),
                });
            }
        }
    }
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn script(json: &str) -> DiffScript {
        DiffScript::from_json_str(json).unwrap()
    }

    fn strict(json: &str, source: &str) -> Result<String, ApplyError> {
        apply(&script(json), source)
    }

    fn lenient(json: &str, source: &str) -> String {
        apply_with_options(&script(json), source, &ApplyOptions::lenient()).unwrap()
    }

    #[test]
    fn pure_source_copy() {
        assert_eq!(strict(r#"["", [0, 5]]"#, "hello world").unwrap(), "hello");
    }

    #[test]
    fn literal_then_source() {
        assert_eq!(strict(r#"["XY", 2, [0, 3]]"#, "abcdef").unwrap(), "XYcde");
    }

    #[test]
    fn negative_offset_back_reference() {
        assert_eq!(strict(r#"["ab", 2, [-2, 2]]"#, "zzzz").unwrap(), "abzz");
    }

    #[test]
    fn malformed_operation_is_reported() {
        let err = apply_json(r#"["", {"bad": 1}]"#, "", &ApplyOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::Script(ScriptError::MalformedOperation { index: 0, .. })
        ));
        assert_eq!(err.op_index(), Some(0));
    }

    #[test]
    fn empty_script_yields_empty_output() {
        assert_eq!(strict(r#"["ignored"]"#, "source").unwrap(), "");
        assert_eq!(lenient(r#"[""]"#, ""), "");
    }

    #[test]
    fn same_region_copied_twice() {
        // Second copy sits at output 3, so delta -3 re-reads source 0..3.
        assert_eq!(strict(r#"["", [0, 3], [-3, 3]]"#, "abc").unwrap(), "abcabc");
    }

    #[test]
    fn noops_never_fail() {
        assert_eq!(strict(r#"["", [100, 0], 0, [-100, 0]]"#, "").unwrap(), "");
        assert_eq!(strict(r#"["a", 1, 0, 0]"#, "").unwrap(), "a");
    }

    #[test]
    fn strict_literal_pool_exhausted() {
        let err = strict(r#"["abc", 2, 2]"#, "").unwrap_err();
        match err {
            ApplyError::LiteralPoolExhausted {
                op,
                start,
                end,
                pool_len,
            } => {
                assert_eq!((op, start, end, pool_len), (1, 2, 4, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strict_source_before_start() {
        let err = strict(r#"["a", 1, [-2, 1]]"#, "xyz").unwrap_err();
        match err {
            ApplyError::SourceOutOfBounds {
                op,
                start,
                end,
                source_len,
            } => {
                assert_eq!((op, start, end, source_len), (1, -1, 0, 3));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn strict_source_past_end() {
        let err = strict(r#"["", [1, 3]]"#, "xyz").unwrap_err();
        assert!(matches!(
            err,
            ApplyError::SourceOutOfBounds {
                op: 0,
                start: 1,
                end: 4,
                source_len: 3
            }
        ));
        assert_eq!(err.op_index(), Some(0));
        assert_eq!(
            err.to_string(),
            "operation 0: source range 1..4 lies outside source of 3 units"
        );
    }

    #[test]
    fn strict_extreme_offsets_do_not_overflow() {
        let err = strict(r#"["", [9223372036854775807, 5]]"#, "abc").unwrap_err();
        assert!(matches!(err, ApplyError::SourceOutOfBounds { .. }));
        let err = strict(r#"["", [-9223372036854775808, 5]]"#, "abc").unwrap_err();
        assert!(matches!(err, ApplyError::SourceOutOfBounds { .. }));
    }

    #[test]
    fn lenient_clamps_like_substring() {
        assert_eq!(lenient(r#"["", [-3, 5]]"#, "abcdef"), "ab");
        assert_eq!(lenient(r#"["", [10, 3]]"#, "abc"), "");
        assert_eq!(lenient(r#"["", [1, 10]]"#, "abc"), "bc");
        assert_eq!(lenient(r#"["", [9223372036854775807, 5]]"#, "abc"), "");
    }

    #[test]
    fn lenient_advances_by_nominal_length() {
        // The literal is clamped to "ab" but the output counter still moves
        // by 4, so the copy reads source 4..6.
        assert_eq!(lenient(r#"["ab", 4, [0, 2]]"#, "0123456789"), "ab45");
        // Pool already drained: later literals emit nothing.
        assert_eq!(lenient(r#"["ab", 2, 3, [0, 1]]"#, "0123456789"), "ab5");
    }

    #[test]
    fn lenient_counts_clamps() {
        let (out, stats) = apply_with_stats(
            &script(r#"["ab", 4, [-10, 2], [0, 1]]"#),
            "0123456789",
            &ApplyOptions::lenient(),
        )
        .unwrap();
        assert_eq!(out, "ab6");
        assert_eq!(stats.clamped_ops, 2);
        assert_eq!(stats.output_units, 7);
        assert_eq!(stats.literal_units, 2);
        assert_eq!(stats.source_units, 1);
    }

    #[test]
    fn stats_for_well_formed_script() {
        let (out, stats) = apply_with_stats(
            &script(r#"["XY", 2, [0, 3]]"#),
            "abcdef",
            &ApplyOptions::default(),
        )
        .unwrap();
        assert_eq!(out, "XYcde");
        assert_eq!(
            stats,
            ApplyStats {
                ops: 2,
                literal_units: 2,
                source_units: 3,
                output_units: 5,
                clamped_ops: 0,
            }
        );
    }

    #[test]
    fn chars_indexing_is_unicode_aware() {
        assert_eq!(strict(r#"["é✓", 1, [0, 2], 1]"#, "aßc𝄞").unwrap(), "éßc✓");
    }

    #[test]
    fn utf16_indexing_counts_code_units() {
        let opts = ApplyOptions::default().with_indexing(Indexing::Utf16);
        let out = apply_with_options(&script(r#"["", [0, 2]]"#), "𝄞x", &opts).unwrap();
        assert_eq!(out, "𝄞");

        let out = apply_with_options(&script(r#"["", [0, 2]]"#), "𝄞x", &ApplyOptions::default())
            .unwrap();
        assert_eq!(out, "𝄞x");
    }

    #[test]
    fn utf16_split_surrogate() {
        let s = script(r#"["", [0, 1]]"#);
        let strict_opts = ApplyOptions::strict().with_indexing(Indexing::Utf16);
        let err = apply_with_options(&s, "𝄞", &strict_opts).unwrap_err();
        assert!(matches!(
            err,
            ApplyError::InvalidUtf16 {
                position: 0,
                unit: 0xD834
            }
        ));

        let lenient_opts = ApplyOptions::lenient().with_indexing(Indexing::Utf16);
        let out = apply_with_options(&s, "𝄞", &lenient_opts).unwrap();
        assert_eq!(out, "\u{FFFD}");
    }

    #[test]
    fn utf16_surrogate_pair_joined_across_ops() {
        let s = script(r#"["", [0, 1], [0, 1]]"#);
        for opts in [ApplyOptions::strict(), ApplyOptions::lenient()] {
            let out = apply_with_options(&s, "😀", &opts.with_indexing(Indexing::Utf16)).unwrap();
            assert_eq!(out, "😀");
        }
    }

    #[test]
    fn negative_zero_ops() {
        assert_eq!(strict(r#"["ab", -0, 2, [-2, 3], [-0, -0]]"#, "xyz").unwrap(), "abxyz");
    }

    #[test]
    fn resolve_range_bounds() {
        assert_eq!(resolve_range(0, 3, 3, Mode::Strict), Some((0, 3, false)));
        assert_eq!(resolve_range(1, 4, 3, Mode::Strict), None);
        assert_eq!(resolve_range(-1, 2, 3, Mode::Strict), None);
        assert_eq!(resolve_range(-1, 2, 3, Mode::Lenient), Some((0, 2, true)));
        assert_eq!(resolve_range(5, 9, 3, Mode::Lenient), Some((3, 3, true)));
    }
}
