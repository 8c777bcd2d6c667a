//! # Utilities (component C1)
//!
//! Identifier safety, C-keyword reservation, string escaping, `#line`
//! emission, and the compile-time constant evaluator. These are the leaf
//! functions every other component builds on.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ast::{BinaryOp, Expr, Program, UnaryOp};

/// The C99 reserved-word set. `safe()` never lets a source
/// identifier collide with one of these.
static C_KEYWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
        "enum", "extern", "float", "for", "goto", "if", "int", "long", "register", "return",
        "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
        "unsigned", "void", "volatile", "while", "bool", "_Bool", "_Complex", "_Imaginary",
        "inline", "restrict",
    ]
    .into_iter()
    .collect()
});

pub fn is_c_keyword(name: &str) -> bool {
    C_KEYWORDS.contains(name)
}

/// `safe(name)`: rewrite a source identifier so it can
/// never collide with a C keyword. The three-rung ladder mirrors the
/// original C backend's `get_safe_c_identifier`.
pub fn safe(name: &str) -> String {
    if !is_c_keyword(name) {
        return name.to_string();
    }
    for candidate in [format!("_{name}"), format!("_{name}_"), format!("uya_{name}")] {
        if !is_c_keyword(&candidate) {
            return candidate;
        }
    }
    // Every rung collided; this cannot happen for the fixed C99 keyword set
    // but fall back to something nobody else can be named.
    format!("uya_{name}_")
}

/// Escapes a filename for embedding inside a `#line "..."` directive or any
/// other double-quoted C string: `\` and `"` are backslash-escaped.
pub fn escape_for_c_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Writes `#line <n> "<file>"` (or without a filename), suppressing
/// back-to-back duplicates. `(line, file)` are tracked on the context;
/// this function is pure and just decides whether to emit, returning the
/// text to append (or `None` for a no-op).
pub fn format_line_directive(line: i64, filename: &str) -> Option<String> {
    if line <= 0 {
        return None;
    }
    if filename.is_empty() {
        Some(format!("#line {line}\n"))
    } else {
        Some(format!(
            "#line {line} \"{}\"\n",
            escape_for_c_string(filename)
        ))
    }
}

/// The djb2-derived error-name hash. Guaranteed nonzero.
pub fn hash_error_name(name: &str) -> u32 {
    let mut h: u32 = 5381;
    for b in name.bytes() {
        h = h.wrapping_shl(5).wrapping_add(h).wrapping_add(b as u32);
    }
    if h == 0 {
        1
    } else {
        h
    }
}

/// Counts the *decoded* byte length of a string-interpolation text segment:
/// an escape sequence (`\n`, `\t`, `\r`, `\\`, `\"`) contributes one byte to
/// the eventual `memcpy` size, not two characters.
pub fn decoded_byte_len(segment: &str) -> usize {
    let mut len = 0usize;
    let mut chars = segment.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if chars.peek().is_some() {
                chars.next();
            }
        }
        len += 1;
    }
    len
}

/// Result of the compile-time constant evaluator. `Unevaluable`
/// is not an error: callers substitute `1` as a diagnostic-grade
/// placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstValue {
    Int(i64),
    Unevaluable,
}

impl ConstValue {
    /// The placeholder substitution used for array sizes and other
    /// required-value positions that turn out unevaluable.
    pub fn or_placeholder(self) -> i64 {
        match self {
            ConstValue::Int(v) => v,
            ConstValue::Unevaluable => {
                log::warn!(
                    "compile-time constant could not be evaluated; substituting placeholder value 1"
                );
                1
            }
        }
    }
}

/// Evaluates integer literals, `const`-qualified global identifiers
/// (recursively), unary `+`/`-`, and binary `+ - * / %` (division/modulo by
/// zero is unevaluable). Everything else is unevaluable.
pub fn eval_const(expr: &Expr, program: &Program) -> ConstValue {
    match expr {
        Expr::IntLiteral { value, .. } => ConstValue::Int(*value),
        Expr::Ident { name, .. } => eval_const_global(name, program),
        Expr::Unary { op, operand, .. } => match (op, eval_const(operand, program)) {
            (UnaryOp::Neg, ConstValue::Int(v)) => ConstValue::Int(-v),
            (UnaryOp::Not, ConstValue::Int(v)) => ConstValue::Int(if v == 0 { 1 } else { 0 }),
            (UnaryOp::BitNot, ConstValue::Int(v)) => ConstValue::Int(!v),
            _ => ConstValue::Unevaluable,
        },
        Expr::Binary { op, lhs, rhs, .. } => {
            let (l, r) = (eval_const(lhs, program), eval_const(rhs, program));
            match (l, r) {
                (ConstValue::Int(l), ConstValue::Int(r)) => match op {
                    BinaryOp::Add => ConstValue::Int(l.wrapping_add(r)),
                    BinaryOp::Sub => ConstValue::Int(l.wrapping_sub(r)),
                    BinaryOp::Mul => ConstValue::Int(l.wrapping_mul(r)),
                    BinaryOp::Div => {
                        if r == 0 {
                            ConstValue::Unevaluable
                        } else {
                            ConstValue::Int(l.wrapping_div(r))
                        }
                    }
                    BinaryOp::Mod => {
                        if r == 0 {
                            ConstValue::Unevaluable
                        } else {
                            ConstValue::Int(l.wrapping_rem(r))
                        }
                    }
                    _ => ConstValue::Unevaluable,
                },
                _ => ConstValue::Unevaluable,
            }
        }
        _ => ConstValue::Unevaluable,
    }
}

fn eval_const_global(name: &str, program: &Program) -> ConstValue {
    for decl in &program.decls {
        if let crate::ast::Decl::VarDecl(v) = decl {
            if v.name == name && v.is_const {
                return match &v.init {
                    Some(init) => eval_const(init, program),
                    None => ConstValue::Unevaluable,
                };
            }
        }
    }
    ConstValue::Unevaluable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_rewrites_keywords() {
        assert_eq!(safe("int"), "_int");
        assert_eq!(safe("value"), "value");
    }

    #[test]
    fn hash_is_nonzero_and_stable() {
        let h1 = hash_error_name("Oops");
        let h2 = hash_error_name("Oops");
        assert_eq!(h1, h2);
        assert_ne!(h1, 0);
    }

    #[test]
    fn line_directive_suppresses_invalid_lines() {
        assert_eq!(format_line_directive(0, "a.uya"), None);
        assert_eq!(
            format_line_directive(3, "a.uya"),
            Some("#line 3 \"a.uya\"\n".to_string())
        );
    }

    #[test]
    fn escape_count_is_one_byte_per_sequence() {
        assert_eq!(decoded_byte_len("\\n"), 1);
        assert_eq!(decoded_byte_len("ab"), 2);
    }
}
