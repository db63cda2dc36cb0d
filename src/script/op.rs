// Diff script data model.
//
// A script is a literal pool followed by operations.  Operations are decoded
// once from the wire form into `Op` and executed by `crate::decoder`.

/// A single diff script operation.
///
/// Lengths are measured in text units (see [`crate::text::Indexing`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Take the next `count` units from the literal pool.
    LiteralCopy { count: usize },
    /// Take `length` units from the source, starting at
    /// `offset_delta + output_len` where `output_len` is the number of units
    /// emitted by all previous operations.
    SourceCopy { offset_delta: i64, length: usize },
}

impl Op {
    /// Number of units this operation contributes to the output length.
    #[inline]
    pub fn len(&self) -> usize {
        match *self {
            Op::LiteralCopy { count } => count,
            Op::SourceCopy { length, .. } => length,
        }
    }

    /// Zero-length operations emit nothing and never fail.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed diff script: the literal pool plus the operations, in order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffScript {
    literals: String,
    ops: Vec<Op>,
}

impl DiffScript {
    pub fn new(literals: impl Into<String>, ops: Vec<Op>) -> Self {
        Self {
            literals: literals.into(),
            ops,
        }
    }

    /// The literal pool consumed by `LiteralCopy` operations.
    pub fn literals(&self) -> &str {
        &self.literals
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// True when the script has no operations (it decodes to `""`).
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sum of the nominal lengths of all operations.
    ///
    /// For a well-formed script this is the length of the decoded output.
    pub fn output_len(&self) -> usize {
        self.ops
            .iter()
            .fold(0usize, |acc, op| acc.saturating_add(op.len()))
    }

    /// Total number of literal pool units the operations ask for.
    pub fn literal_demand(&self) -> usize {
        self.ops.iter().fold(0usize, |acc, op| match *op {
            Op::LiteralCopy { count } => acc.saturating_add(count),
            Op::SourceCopy { .. } => acc,
        })
    }

    pub fn into_parts(self) -> (String, Vec<Op>) {
        (self.literals, self.ops)
    }
}
