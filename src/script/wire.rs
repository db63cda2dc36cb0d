// JSON wire format for diff scripts.
//
//   [ "<literal pool>", op, op, ... ]
//
// where each op is either a non-negative integer `n` (LiteralCopy) or a
// two-element array `[offset_delta, length]` (SourceCopy).  There is no
// header, version tag, or checksum.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use thiserror::Error;

use super::op::{DiffScript, Op};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to turn wire input into a [`DiffScript`].
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("diff script must be a JSON array")]
    NotAnArray,

    #[error("diff script is missing its literal pool")]
    MissingLiteralPool,

    #[error("literal pool must be a string")]
    LiteralPoolNotString,

    /// `index` is zero-based over the operations; the element's position in
    /// the JSON array is `index + 1`.
    #[error("malformed operation {index}: {reason}")]
    MalformedOperation { index: usize, reason: &'static str },
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

impl DiffScript {
    /// Parse a script from its JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ScriptError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Parse a script from an already-decoded JSON value.
    pub fn from_value(value: &Value) -> Result<Self, ScriptError> {
        let Value::Array(elements) = value else {
            return Err(ScriptError::NotAnArray);
        };
        let (pool, rest) = elements
            .split_first()
            .ok_or(ScriptError::MissingLiteralPool)?;
        let Value::String(literals) = pool else {
            return Err(ScriptError::LiteralPoolNotString);
        };

        let ops = rest
            .iter()
            .enumerate()
            .map(|(index, element)| {
                decode_op(element)
                    .map_err(|reason| ScriptError::MalformedOperation { index, reason })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::trace!(
            "parsed diff script: {} literal bytes, {} ops",
            literals.len(),
            ops.len()
        );
        Ok(DiffScript::new(literals.as_str(), ops))
    }
}

fn decode_op(element: &Value) -> Result<Op, &'static str> {
    match element {
        Value::Number(_) => match integer(element) {
            Some(count) if count >= 0 => {
                let count =
                    usize::try_from(count).map_err(|_| "literal count does not fit in usize")?;
                Ok(Op::LiteralCopy { count })
            }
            Some(_) => Err("literal count is negative"),
            None => Err("literal count is not an integer"),
        },
        Value::Array(pair) => match pair.as_slice() {
            [offset, length] => {
                let offset_delta = integer(offset)
                    .and_then(|v| i64::try_from(v).ok())
                    .ok_or("offset delta is not a signed 64-bit integer")?;
                let length = integer(length)
                    .and_then(|v| u64::try_from(v).ok())
                    .ok_or("copy length is not a non-negative integer")?;
                let length =
                    usize::try_from(length).map_err(|_| "copy length does not fit in usize")?;
                Ok(Op::SourceCopy {
                    offset_delta,
                    length,
                })
            }
            _ => Err("source copy must be an [offset, length] pair"),
        },
        Value::Object(_) => Err("objects are not valid operations"),
        _ => Err("expected a count or an [offset, length] pair"),
    }
}

/// Integer value of a JSON number, `None` for floats and non-numbers.
/// serde_json reads `-0` as the float `-0.0`, so a zero float counts as 0.
fn integer(value: &Value) -> Option<i128> {
    let Value::Number(n) = value else {
        return None;
    };
    if let Some(v) = n.as_i64() {
        Some(v.into())
    } else if let Some(v) = n.as_u64() {
        Some(v.into())
    } else if n.as_f64() == Some(0.0) {
        Some(0)
    } else {
        None
    }
}

impl FromStr for DiffScript {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_json_str(s)
    }
}

impl TryFrom<&Value> for DiffScript {
    type Error = ScriptError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

impl DiffScript {
    /// Canonical wire form of this script.
    pub fn to_value(&self) -> Value {
        let mut elements = Vec::with_capacity(self.ops().len() + 1);
        elements.push(Value::String(self.literals().to_owned()));
        elements.extend(self.ops().iter().map(encode_op));
        Value::Array(elements)
    }

    /// Compact JSON text of [`DiffScript::to_value`].
    pub fn to_json_string(&self) -> String {
        self.to_value().to_string()
    }
}

fn encode_op(op: &Op) -> Value {
    match *op {
        Op::LiteralCopy { count } => Value::from(count as u64),
        Op::SourceCopy {
            offset_delta,
            length,
        } => Value::Array(vec![Value::from(offset_delta), Value::from(length as u64)]),
    }
}

impl fmt::Display for DiffScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn malformed_index(err: ScriptError) -> usize {
        match err {
            ScriptError::MalformedOperation { index, .. } => index,
            other => panic!("expected MalformedOperation, got {other:?}"),
        }
    }

    #[test]
    fn parse_mixed_script() {
        let script = DiffScript::from_json_str(r#"["XY", 2, [0, 3], [-2, 1], 0]"#).unwrap();
        assert_eq!(script.literals(), "XY");
        assert_eq!(
            script.ops(),
            &[
                Op::LiteralCopy { count: 2 },
                Op::SourceCopy {
                    offset_delta: 0,
                    length: 3
                },
                Op::SourceCopy {
                    offset_delta: -2,
                    length: 1
                },
                Op::LiteralCopy { count: 0 },
            ]
        );
    }

    #[test]
    fn parse_pool_only() {
        let script = DiffScript::from_json_str(r#"["unused"]"#).unwrap();
        assert_eq!(script.literals(), "unused");
        assert!(script.is_empty());
    }

    #[test]
    fn negative_zero_is_an_integer() {
        let script = DiffScript::from_json_str(r#"["", -0, [-0, 0], [3, -0]]"#).unwrap();
        assert_eq!(
            script.ops(),
            &[
                Op::LiteralCopy { count: 0 },
                Op::SourceCopy {
                    offset_delta: 0,
                    length: 0
                },
                Op::SourceCopy {
                    offset_delta: 3,
                    length: 0
                },
            ]
        );
    }

    #[test]
    fn object_operation_is_malformed() {
        let err = DiffScript::from_json_str(r#"["", {"bad": 1}]"#).unwrap_err();
        assert_eq!(malformed_index(err), 0);
    }

    #[test]
    fn malformed_index_points_at_offending_op() {
        let err = DiffScript::from_json_str(r#"["abc", 1, [0, 1], "x"]"#).unwrap_err();
        assert_eq!(malformed_index(err), 2);
    }

    #[test]
    fn rejects_bad_shapes() {
        let cases = [
            json!(["", -1]),
            json!(["", 1.5]),
            json!(["", [1]]),
            json!(["", [1, 2, 3]]),
            json!(["", [0, -1]]),
            json!(["", [0.5, 1]]),
            json!(["", ["0", 1]]),
            json!(["", null]),
            json!(["", true]),
            json!(["", "3"]),
            json!(["", [u64::MAX, 1]]),
        ];
        for case in &cases {
            let err = DiffScript::from_value(case).unwrap_err();
            assert!(
                matches!(err, ScriptError::MalformedOperation { index: 0, .. }),
                "{case}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_bad_envelopes() {
        assert!(matches!(
            DiffScript::from_json_str("{}"),
            Err(ScriptError::NotAnArray)
        ));
        assert!(matches!(
            DiffScript::from_json_str("[]"),
            Err(ScriptError::MissingLiteralPool)
        ));
        assert!(matches!(
            DiffScript::from_json_str("[3, 1]"),
            Err(ScriptError::LiteralPoolNotString)
        ));
        assert!(matches!(
            DiffScript::from_json_str("[\"a\", "),
            Err(ScriptError::Json(_))
        ));
    }

    #[test]
    fn emits_canonical_form() {
        let script = DiffScript::new(
            "hi",
            vec![
                Op::LiteralCopy { count: 2 },
                Op::SourceCopy {
                    offset_delta: -4,
                    length: 6,
                },
            ],
        );
        assert_eq!(script.to_json_string(), r#"["hi",2,[-4,6]]"#);
        assert_eq!(script.to_string(), script.to_json_string());
        assert_eq!(script.to_json_string().parse::<DiffScript>().unwrap(), script);
    }

    #[test]
    fn large_unsigned_length_parses() {
        let script = DiffScript::from_json_str(r#"["", [-9223372036854775808, 0]]"#).unwrap();
        assert_eq!(
            script.ops()[0],
            Op::SourceCopy {
                offset_delta: i64::MIN,
                length: 0
            }
        );
    }
}
