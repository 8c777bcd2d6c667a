use super::{Span, TypeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// The C spelling of the operator. Used verbatim; precedence is handled
    /// by fully parenthesising every binary expression.
    pub fn as_c_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Ne)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
    /// `&expr` — address-of.
    Ref,
    /// `*expr` — dereference.
    Deref,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SizeofOperand {
    Type(TypeNode),
    Value(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum InterpSegment {
    Text(String),
    /// A `{expr}` or `{expr:fmt}` placeholder; `format` defaults to `%d`
    /// when absent.
    Placeholder {
        expr: Box<Expr>,
        format: Option<String>,
    },
}

/// Expression AST. Covers every listed expression kind;
/// `EnumName.Variant` is deliberately *not* its own variant — like the
/// original C backend, it is represented as a plain `MemberAccess` and
/// disambiguated from a real field access at codegen time by consulting the
/// enum table.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    IntLiteral {
        value: i64,
        span: Span,
    },
    FloatLiteral {
        value: f64,
        span: Span,
    },
    BoolLiteral {
        value: bool,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
    NullLiteral {
        span: Span,
    },
    Ident {
        name: String,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    MemberAccess {
        object: Box<Expr>,
        field: String,
        span: Span,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    SliceExpr {
        array: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
        span: Span,
    },
    StructInit {
        struct_name: String,
        type_args: Vec<TypeNode>,
        fields: Vec<(String, Expr)>,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Expr>,
        span: Span,
    },
    Sizeof {
        operand: SizeofOperand,
        span: Span,
    },
    Len {
        operand: Box<Expr>,
        span: Span,
    },
    Alignof {
        operand: TypeNode,
        span: Span,
    },
    Cast {
        operand: Box<Expr>,
        target: TypeNode,
        /// `as! T` (force-cast, narrows `!T` to `T`) vs plain `as T`.
        force: bool,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    StringInterp {
        segments: Vec<InterpSegment>,
        span: Span,
    },
    /// `error.Name` — constructs an error-union value carrying the named
    /// error.
    ErrorValue {
        name: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::IntLiteral { span, .. }
            | Expr::FloatLiteral { span, .. }
            | Expr::BoolLiteral { span, .. }
            | Expr::StringLiteral { span, .. }
            | Expr::NullLiteral { span }
            | Expr::Ident { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::MemberAccess { span, .. }
            | Expr::ArrayAccess { span, .. }
            | Expr::SliceExpr { span, .. }
            | Expr::StructInit { span, .. }
            | Expr::ArrayLiteral { span, .. }
            | Expr::Sizeof { span, .. }
            | Expr::Len { span, .. }
            | Expr::Alignof { span, .. }
            | Expr::Cast { span, .. }
            | Expr::Call { span, .. }
            | Expr::Assign { span, .. }
            | Expr::StringInterp { span, .. }
            | Expr::ErrorValue { span, .. } => span,
        }
    }
}
