use std::fmt;

/// Source location of a single AST node, carried through from the (out of
/// scope) parser so the emitter can produce `#line` directives.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub filename: String,
}

impl Span {
    pub fn new(line: usize, column: usize, filename: impl Into<String>) -> Self {
        Self {
            line,
            column,
            filename: filename.into(),
        }
    }

    /// A span with no useful location; `emit_line` treats `line <= 0` as a
    /// no-op, so this is a safe default for synthesized nodes.
    pub fn synthetic() -> Self {
        Self {
            line: 0,
            column: 0,
            filename: String::new(),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}:{})", self.filename, self.line, self.column)
    }
}
