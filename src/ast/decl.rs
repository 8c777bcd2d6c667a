use super::{Block, Expr, Span, TypeNode};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FnDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub return_type: TypeNode,
    /// `None` for an `extern`/prototype-only declaration.
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeNode,
    pub is_const: bool,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Field {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<Field>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumVariant {
    pub name: String,
    /// An explicit discriminant, when the source wrote one.
    pub value: Option<i64>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumDecl {
    pub name: String,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum UnionKind {
    Tagged,
    Extern,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnionDecl {
    pub name: String,
    pub kind: UnionKind,
    pub variants: Vec<Field>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    /// Composed (inherited) interfaces, contributing their methods first in
    /// order with duplicate names by first occurrence suppressed.
    pub extends: Vec<String>,
    pub methods: Vec<MethodSig>,
    pub span: Span,
}

/// A `impl StructName [: InterfaceName] { ... }` block. Each method's first
/// parameter carries the receiver type (`Self`, `&Self`, or `*Self`);
/// `Self`-substitution is applied when lowering it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodBlock {
    pub struct_name: String,
    pub implements: Option<String>,
    pub methods: Vec<FnDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Decl {
    FnDecl(FnDecl),
    VarDecl(VarDecl),
    StructDecl(StructDecl),
    EnumDecl(EnumDecl),
    UnionDecl(UnionDecl),
    InterfaceDecl(InterfaceDecl),
    MethodBlock(MethodBlock),
}

impl Decl {
    pub fn span(&self) -> &Span {
        match self {
            Decl::FnDecl(d) => &d.span,
            Decl::VarDecl(d) => &d.span,
            Decl::StructDecl(d) => &d.span,
            Decl::EnumDecl(d) => &d.span,
            Decl::UnionDecl(d) => &d.span,
            Decl::InterfaceDecl(d) => &d.span,
            Decl::MethodBlock(d) => &d.span,
        }
    }
}

/// The AST root handed to the emitter.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Program {
    pub decls: Vec<Decl>,
}
