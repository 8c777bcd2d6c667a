use std::fmt;

use crate::ast::Span;

/// Failures the emitter can produce. Unsupported-construct and
/// unevaluable-constant cases are *not* represented here: they degrade to
/// a placeholder plus a logged warning rather than aborting the whole
/// translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// A required top-level input was missing or the root AST node was not
    /// a `Program`.
    InvalidInput(String),
    /// Two distinct error names hashed to the same 32-bit id.
    ErrorHashCollision {
        first: String,
        second: String,
        hash: u32,
    },
    /// An internal fixed-size table ran out of room.
    CapacityExceeded { table: &'static str, limit: usize },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            CodegenError::ErrorHashCollision {
                first,
                second,
                hash,
            } => write!(
                f,
                "error names '{first}' and '{second}' both hash to {hash:#010x}; rename one of them (e.g. '{second}_Alt') to resolve the collision",
            ),
            CodegenError::CapacityExceeded { table, limit } => {
                write!(f, "internal table '{table}' exceeded its capacity of {limit}")
            }
        }
    }
}

impl std::error::Error for CodegenError {}

/// Formats a diagnostic with the `file(line:col)` prefix expected on
/// stderr output.
pub fn diagnostic(span: &Span, err: &CodegenError) -> String {
    format!("{span}: {err}")
}
