use super::{Expr, Span, TypeNode};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

/// A local `let`/`const` binding.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LocalVarDecl {
    pub name: String,
    pub ty: Option<TypeNode>,
    pub is_const: bool,
    pub init: Option<Expr>,
    pub span: Span,
}

/// Statement AST. Assignment is deliberately absent here: it is
/// `Expr::Assign` wrapped in `Statement::Expr`, matching the source
/// grammar's treatment of assignment as an expression.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Statement {
    Expr(Expr),
    Return {
        value: Option<Expr>,
        span: Span,
    },
    If {
        condition: Expr,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Block,
        span: Span,
    },
    For {
        binding: String,
        /// `for &item in arr` binds `item` as a pointer to each element.
        by_ref: bool,
        iterable: Expr,
        body: Block,
        span: Span,
    },
    Break {
        span: Span,
    },
    Continue {
        span: Span,
    },
    Defer {
        body: Block,
        span: Span,
    },
    ErrDefer {
        body: Block,
        span: Span,
    },
    Block(Block),
    VarDecl(LocalVarDecl),
}

impl Statement {
    pub fn span(&self) -> &Span {
        match self {
            Statement::Expr(e) => e.span(),
            Statement::Return { span, .. }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::For { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::Defer { span, .. }
            | Statement::ErrDefer { span, .. } => span,
            Statement::Block(b) => &b.span,
            Statement::VarDecl(v) => &v.span,
        }
    }
}
