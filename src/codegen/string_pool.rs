//! # String-constant pool (component C2)
//!
//! Before any code is emitted, every string literal and every
//! string-interpolation text segment / per-placeholder format string in the
//! program is interned into the pool by a recursive walk, so the `strN`
//! constants can be written out before the first place they're used.

use crate::ast::{Block, Decl, Expr, InterpSegment, Program, SizeofOperand, Statement};
use crate::codegen::context::GeneratorContext;

/// Walks every declaration's expressions and statements, interning every
/// string literal and interpolation segment/format string it finds. Must run before any other emission phase.
pub fn collect_string_constants(ctx: &mut GeneratorContext<'_>) {
    let program: &Program = ctx.program_root;
    let decls = program.decls.clone();
    for decl in &decls {
        match decl {
            Decl::FnDecl(f) => {
                if let Some(body) = &f.body {
                    walk_block(ctx, body);
                }
            }
            Decl::VarDecl(v) => {
                if let Some(init) = &v.init {
                    walk_expr(ctx, init);
                }
            }
            Decl::MethodBlock(m) => {
                for method in &m.methods {
                    if let Some(body) = &method.body {
                        walk_block(ctx, body);
                    }
                }
            }
            Decl::StructDecl(_) | Decl::EnumDecl(_) | Decl::UnionDecl(_) | Decl::InterfaceDecl(_) => {}
        }
    }
}

fn walk_block(ctx: &mut GeneratorContext<'_>, block: &Block) {
    for stmt in &block.statements {
        walk_stmt(ctx, stmt);
    }
}

fn walk_stmt(ctx: &mut GeneratorContext<'_>, stmt: &Statement) {
    match stmt {
        Statement::Expr(e) => walk_expr(ctx, e),
        Statement::Return { value, .. } => {
            if let Some(v) = value {
                walk_expr(ctx, v);
            }
        }
        Statement::If {
            condition,
            then_block,
            else_block,
            ..
        } => {
            walk_expr(ctx, condition);
            walk_block(ctx, then_block);
            if let Some(e) = else_block {
                walk_block(ctx, e);
            }
        }
        Statement::While { condition, body, .. } => {
            walk_expr(ctx, condition);
            walk_block(ctx, body);
        }
        Statement::For { iterable, body, .. } => {
            walk_expr(ctx, iterable);
            walk_block(ctx, body);
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Defer { body, .. } | Statement::ErrDefer { body, .. } => walk_block(ctx, body),
        Statement::Block(b) => walk_block(ctx, b),
        Statement::VarDecl(v) => {
            if let Some(init) = &v.init {
                walk_expr(ctx, init);
            }
        }
    }
}

fn walk_expr(ctx: &mut GeneratorContext<'_>, expr: &Expr) {
    match expr {
        Expr::StringLiteral { value, .. } => {
            ctx.intern_string(value);
        }
        Expr::StringInterp { segments, .. } => {
            for seg in segments {
                match seg {
                    InterpSegment::Text(text) => {
                        ctx.intern_string(text);
                    }
                    InterpSegment::Placeholder { expr, format } => {
                        let fmt = format.clone().unwrap_or_else(|| "%d".to_string());
                        ctx.intern_string(&fmt);
                        walk_expr(ctx, expr);
                    }
                }
            }
        }
        Expr::Binary { lhs, rhs, .. } => {
            walk_expr(ctx, lhs);
            walk_expr(ctx, rhs);
        }
        Expr::Unary { operand, .. } => walk_expr(ctx, operand),
        Expr::MemberAccess { object, .. } => walk_expr(ctx, object),
        Expr::ArrayAccess { array, index, .. } => {
            walk_expr(ctx, array);
            walk_expr(ctx, index);
        }
        Expr::SliceExpr {
            array, start, end, ..
        } => {
            walk_expr(ctx, array);
            if let Some(s) = start {
                walk_expr(ctx, s);
            }
            if let Some(e) = end {
                walk_expr(ctx, e);
            }
        }
        Expr::StructInit { fields, .. } => {
            for (_, value) in fields {
                walk_expr(ctx, value);
            }
        }
        Expr::ArrayLiteral { elements, .. } => {
            for e in elements {
                walk_expr(ctx, e);
            }
        }
        Expr::Sizeof { operand, .. } => {
            if let SizeofOperand::Value(v) = operand {
                walk_expr(ctx, v);
            }
        }
        Expr::Len { operand, .. } => walk_expr(ctx, operand),
        Expr::Cast { operand, .. } => walk_expr(ctx, operand),
        Expr::Call { callee, args, .. } => {
            walk_expr(ctx, callee);
            for a in args {
                walk_expr(ctx, a);
            }
        }
        Expr::Assign { target, value, .. } => {
            walk_expr(ctx, target);
            walk_expr(ctx, value);
        }
        Expr::IntLiteral { .. }
        | Expr::FloatLiteral { .. }
        | Expr::BoolLiteral { .. }
        | Expr::NullLiteral { .. }
        | Expr::Ident { .. }
        | Expr::Alignof { .. }
        | Expr::ErrorValue { .. } => {}
    }
}

/// Emits `static const char strN[] = "...";` for every pooled literal, in
/// insertion order.
pub fn emit_string_constants(ctx: &mut GeneratorContext<'_>) {
    let entries: Vec<(String, String)> = ctx
        .string_constants()
        .iter()
        .enumerate()
        .map(|(i, text)| (format!("str{i}"), text.clone()))
        .collect();
    for (id, text) in entries {
        let escaped = crate::codegen::util::escape_for_c_string(&text);
        ctx.emit_line(&format!("static const char {id}[] = \"{escaped}\";"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Span;

    #[test]
    fn dedups_identical_literals() {
        let program = Program {
            decls: vec![Decl::VarDecl(crate::ast::VarDecl {
                name: "g".into(),
                ty: crate::ast::TypeNode::named("i32"),
                is_const: true,
                init: Some(Expr::StringLiteral {
                    value: "hi".into(),
                    span: Span::synthetic(),
                }),
                span: Span::synthetic(),
            })],
        };
        let mut ctx = GeneratorContext::new(&program, true);
        collect_string_constants(&mut ctx);
        let id1 = ctx.intern_string("hi");
        assert_eq!(ctx.string_constants().len(), 1);
        assert_eq!(id1, "str0");
    }
}
