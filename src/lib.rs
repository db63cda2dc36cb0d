//! Minidiff: decoder for compact copy/literal text diff scripts.
//!
//! A diff script is a JSON array whose first element is a *literal pool*
//! and whose remaining elements are operations:
//!
//! - `n` copies the next `n` units of the literal pool,
//! - `[offset_delta, length]` copies `length` units of the source starting
//!   at `offset_delta` plus the number of units already emitted.
//!
//! The crate provides:
//! - The script model and JSON wire codec (`script`)
//! - Text unit views, chars or UTF-16 (`text`)
//! - The decoder with strict and lenient modes (`decoder`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use minidiff::decoder::{self, ApplyOptions};
//!
//! let out = decoder::apply_json(r#"["ab", 2, [-2, 2]]"#, "zzzz", &ApplyOptions::default()).unwrap();
//! assert_eq!(out, "abzz");
//! ```

pub mod decoder;
pub mod io;
pub mod script;
pub mod text;

#[cfg(feature = "cli")]
pub mod cli;

pub use decoder::{ApplyError, ApplyOptions, ApplyStats, Mode, apply, apply_json};
pub use script::{DiffScript, Op, ScriptError};
pub use text::Indexing;
