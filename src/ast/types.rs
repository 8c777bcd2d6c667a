use super::{Expr, Span};

/// A type as written in the elaborated source AST. Every
/// resolved name here is already a valid identifier in the source language;
/// the emitter's job is to map these into C spellings.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TypeNode {
    /// A primitive (`i32`, `u8`, `usize`, `f64`, `bool`, `byte`, `void`, …)
    /// or a user-defined struct/enum/union/interface name, with optional
    /// generic type arguments (`Pair<T, U>`). `Self` is also spelled this
    /// way, with an empty argument list.
    Named {
        name: String,
        type_args: Vec<TypeNode>,
        span: Span,
    },
    /// `*T` (is_ffi_pointer = true) or `&T` (is_ffi_pointer = false). The
    /// flag is the parser's way of telling the emitter which of the two
    /// source-level pointer forms produced this node, since both lower to
    /// the same C spelling but differ in `const`-ness and `Self`
    /// substitution.
    Pointer {
        inner: Box<TypeNode>,
        is_ffi_pointer: bool,
        span: Span,
    },
    Array {
        element: Box<TypeNode>,
        size: Box<Expr>,
        span: Span,
    },
    Slice {
        element: Box<TypeNode>,
        span: Span,
    },
    Tuple {
        elements: Vec<TypeNode>,
        span: Span,
    },
    /// `!T`. `payload` is `TypeNode::Named{name: "void", ..}` for the
    /// value-less `!void` form.
    ErrorUnion {
        payload: Box<TypeNode>,
        span: Span,
    },
    Atomic {
        inner: Box<TypeNode>,
        span: Span,
    },
}

impl TypeNode {
    pub fn span(&self) -> &Span {
        match self {
            TypeNode::Named { span, .. }
            | TypeNode::Pointer { span, .. }
            | TypeNode::Array { span, .. }
            | TypeNode::Slice { span, .. }
            | TypeNode::Tuple { span, .. }
            | TypeNode::ErrorUnion { span, .. }
            | TypeNode::Atomic { span, .. } => span,
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        TypeNode::Named {
            name: name.into(),
            type_args: Vec::new(),
            span: Span::synthetic(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeNode::Named { name, .. } if name == "void")
    }

    pub fn as_named(&self) -> Option<(&str, &[TypeNode])> {
        match self {
            TypeNode::Named { name, type_args, .. } => Some((name.as_str(), type_args.as_slice())),
            _ => None,
        }
    }
}
