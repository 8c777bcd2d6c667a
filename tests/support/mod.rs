//! Shared AST-builder helpers for the integration tests in this directory.
//! Every node gets a synthetic span — `#line` output is irrelevant to what
//! these tests check and generation is always run with directives off.

use uya::ast::*;

pub fn sp() -> Span {
    Span::synthetic()
}

pub fn named(name: &str) -> TypeNode {
    TypeNode::named(name)
}

pub fn ptr(inner: TypeNode) -> TypeNode {
    TypeNode::Pointer {
        inner: Box::new(inner),
        is_ffi_pointer: false,
        span: sp(),
    }
}

pub fn array_ty(element: TypeNode, size: i64) -> TypeNode {
    TypeNode::Array {
        element: Box::new(element),
        size: Box::new(int_lit(size)),
        span: sp(),
    }
}

pub fn error_union(payload: TypeNode) -> TypeNode {
    TypeNode::ErrorUnion {
        payload: Box::new(payload),
        span: sp(),
    }
}

pub fn int_lit(v: i64) -> Expr {
    Expr::IntLiteral { value: v, span: sp() }
}

pub fn ident(name: &str) -> Expr {
    Expr::Ident {
        name: name.to_string(),
        span: sp(),
    }
}

pub fn member(object: Expr, field: &str) -> Expr {
    Expr::MemberAccess {
        object: Box::new(object),
        field: field.to_string(),
        span: sp(),
    }
}

pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args,
        span: sp(),
    }
}

pub fn struct_init(struct_name: &str, type_args: Vec<TypeNode>, fields: Vec<(&str, Expr)>) -> Expr {
    Expr::StructInit {
        struct_name: struct_name.to_string(),
        type_args,
        fields: fields.into_iter().map(|(n, e)| (n.to_string(), e)).collect(),
        span: sp(),
    }
}

pub fn array_literal(elements: Vec<Expr>) -> Expr {
    Expr::ArrayLiteral { elements, span: sp() }
}

pub fn error_value(name: &str) -> Expr {
    Expr::ErrorValue {
        name: name.to_string(),
        span: sp(),
    }
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block { statements, span: sp() }
}

pub fn ret(value: Option<Expr>) -> Statement {
    Statement::Return { value, span: sp() }
}

pub fn expr_stmt(e: Expr) -> Statement {
    Statement::Expr(e)
}

pub fn defer(body: Block) -> Statement {
    Statement::Defer { body, span: sp() }
}

pub fn errdefer(body: Block) -> Statement {
    Statement::ErrDefer { body, span: sp() }
}

pub fn param(name: &str, ty: TypeNode) -> Param {
    Param {
        name: name.to_string(),
        ty,
        span: sp(),
    }
}

pub fn fn_decl(name: &str, params: Vec<Param>, return_type: TypeNode, body: Vec<Statement>) -> FnDecl {
    FnDecl {
        name: name.to_string(),
        type_params: Vec::new(),
        params,
        return_type,
        body: Some(block(body)),
        span: sp(),
    }
}

pub fn generic_fn_decl(
    name: &str,
    type_params: Vec<&str>,
    params: Vec<Param>,
    return_type: TypeNode,
    body: Vec<Statement>,
) -> FnDecl {
    FnDecl {
        name: name.to_string(),
        type_params: type_params.into_iter().map(String::from).collect(),
        params,
        return_type,
        body: Some(block(body)),
        span: sp(),
    }
}

pub fn field(name: &str, ty: TypeNode) -> Field {
    Field {
        name: name.to_string(),
        ty,
        span: sp(),
    }
}

pub fn struct_decl(name: &str, type_params: Vec<&str>, fields: Vec<Field>) -> StructDecl {
    StructDecl {
        name: name.to_string(),
        type_params: type_params.into_iter().map(String::from).collect(),
        fields,
        span: sp(),
    }
}

pub fn var_decl(name: &str, ty: TypeNode, is_const: bool, init: Option<Expr>) -> VarDecl {
    VarDecl {
        name: name.to_string(),
        ty,
        is_const,
        init,
        span: sp(),
    }
}

pub fn method_sig(name: &str, params: Vec<Param>, return_type: TypeNode) -> MethodSig {
    MethodSig {
        name: name.to_string(),
        params,
        return_type,
        span: sp(),
    }
}

pub fn interface_decl(name: &str, extends: Vec<&str>, methods: Vec<MethodSig>) -> InterfaceDecl {
    InterfaceDecl {
        name: name.to_string(),
        extends: extends.into_iter().map(String::from).collect(),
        methods,
        span: sp(),
    }
}

pub fn method_block(struct_name: &str, implements: Option<&str>, methods: Vec<FnDecl>) -> MethodBlock {
    MethodBlock {
        struct_name: struct_name.to_string(),
        implements: implements.map(String::from),
        methods,
        span: sp(),
    }
}

pub fn program(decls: Vec<Decl>) -> Program {
    Program { decls }
}
