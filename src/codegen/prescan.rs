//! Pre-pass type discovery.
//!
//! Wrapper types (slices, error unions, monomorphised generics, array-return
//! wrappers) are queued the first time `lower_type` sees them, and the
//! queue is drained into the output once, ahead of the code that uses the
//! wrapper. Struct/union field types are naturally discovered while struct
//! bodies emit (component C4), but types that only ever appear in a
//! function signature or body would otherwise be discovered too late — the
//! function text referencing them would already be in the output buffer by
//! the time the wrapper got queued. This walk (mirroring the string pool's
//! walk in structure) forces every signature and body to be visited once,
//! purely for `lower_type`'s queuing side effect, before the orchestrator
//! drains the wrapper queue and starts emitting prototypes.

use crate::ast::{
    Block, Decl, Expr, FnDecl, InterpSegment, SizeofOperand, Statement, TypeNode,
};
use crate::codegen::context::GeneratorContext;

pub fn prescan_types(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        match decl {
            Decl::FnDecl(f) => prescan_fn(ctx, f, None),
            Decl::MethodBlock(m) => {
                for method in &m.methods {
                    prescan_fn(ctx, method, Some(m.struct_name.clone()));
                }
            }
            Decl::VarDecl(v) => {
                ctx.lower_type(&v.ty);
                if let Some(init) = &v.init {
                    prescan_expr(ctx, init);
                }
            }
            Decl::StructDecl(_) | Decl::EnumDecl(_) | Decl::UnionDecl(_) | Decl::InterfaceDecl(_) => {}
        }
    }
}

fn prescan_fn(ctx: &mut GeneratorContext<'_>, f: &FnDecl, struct_name: Option<String>) {
    let saved = ctx.current_method_struct_name.take();
    ctx.current_method_struct_name = struct_name;
    for p in &f.params {
        ctx.lower_type(&p.ty);
    }
    match &f.return_type {
        TypeNode::Array { element, size, .. } => {
            let n = crate::codegen::util::eval_const(size, ctx.program_root).or_placeholder();
            ctx.lower_array_return_wrapper(element, n);
        }
        other => {
            ctx.lower_type(other);
        }
    }
    if let Some(body) = &f.body {
        prescan_block(ctx, body);
    }
    ctx.current_method_struct_name = saved;
}

fn prescan_block(ctx: &mut GeneratorContext<'_>, block: &Block) {
    for stmt in &block.statements {
        prescan_stmt(ctx, stmt);
    }
}

fn prescan_stmt(ctx: &mut GeneratorContext<'_>, stmt: &Statement) {
    match stmt {
        Statement::Expr(e) => prescan_expr(ctx, e),
        Statement::Return { value, .. } => {
            if let Some(v) = value {
                prescan_expr(ctx, v);
            }
        }
        Statement::If {
            condition,
            then_block,
            else_block,
            ..
        } => {
            prescan_expr(ctx, condition);
            prescan_block(ctx, then_block);
            if let Some(e) = else_block {
                prescan_block(ctx, e);
            }
        }
        Statement::While { condition, body, .. } => {
            prescan_expr(ctx, condition);
            prescan_block(ctx, body);
        }
        Statement::For { iterable, body, .. } => {
            prescan_expr(ctx, iterable);
            prescan_block(ctx, body);
        }
        Statement::Break { .. } | Statement::Continue { .. } => {}
        Statement::Defer { body, .. } | Statement::ErrDefer { body, .. } => prescan_block(ctx, body),
        Statement::Block(b) => prescan_block(ctx, b),
        Statement::VarDecl(v) => {
            if let Some(ty) = &v.ty {
                ctx.lower_type(ty);
            }
            if let Some(init) = &v.init {
                prescan_expr(ctx, init);
            }
        }
    }
}

fn prescan_expr(ctx: &mut GeneratorContext<'_>, expr: &Expr) {
    match expr {
        Expr::Binary { lhs, rhs, .. } => {
            prescan_expr(ctx, lhs);
            prescan_expr(ctx, rhs);
        }
        Expr::Unary { operand, .. } => prescan_expr(ctx, operand),
        Expr::MemberAccess { object, .. } => prescan_expr(ctx, object),
        Expr::ArrayAccess { array, index, .. } => {
            prescan_expr(ctx, array);
            prescan_expr(ctx, index);
        }
        Expr::SliceExpr {
            array, start, end, ..
        } => {
            prescan_expr(ctx, array);
            if let Some(s) = start {
                prescan_expr(ctx, s);
            }
            if let Some(e) = end {
                prescan_expr(ctx, e);
            }
        }
        Expr::StructInit {
            struct_name,
            type_args,
            fields,
            span,
        } => {
            if !type_args.is_empty() {
                ctx.lower_type(&TypeNode::Named {
                    name: struct_name.clone(),
                    type_args: type_args.clone(),
                    span: span.clone(),
                });
            }
            for (_, v) in fields {
                prescan_expr(ctx, v);
            }
        }
        Expr::ArrayLiteral { elements, .. } => {
            for e in elements {
                prescan_expr(ctx, e);
            }
        }
        Expr::Sizeof { operand, .. } => match operand {
            SizeofOperand::Type(t) => {
                ctx.lower_type(t);
            }
            SizeofOperand::Value(v) => prescan_expr(ctx, v),
        },
        Expr::Len { operand, .. } => prescan_expr(ctx, operand),
        Expr::Alignof { operand, .. } => {
            ctx.lower_type(operand);
        }
        Expr::Cast { operand, target, .. } => {
            prescan_expr(ctx, operand);
            ctx.lower_type(target);
        }
        Expr::Call { callee, args, .. } => {
            prescan_expr(ctx, callee);
            for a in args {
                prescan_expr(ctx, a);
            }
        }
        Expr::Assign { target, value, .. } => {
            prescan_expr(ctx, target);
            prescan_expr(ctx, value);
        }
        Expr::StringInterp { segments, .. } => {
            for seg in segments {
                if let InterpSegment::Placeholder { expr, .. } = seg {
                    prescan_expr(ctx, expr);
                }
            }
        }
        Expr::IntLiteral { .. }
        | Expr::FloatLiteral { .. }
        | Expr::BoolLiteral { .. }
        | Expr::StringLiteral { .. }
        | Expr::NullLiteral { .. }
        | Expr::Ident { .. }
        | Expr::ErrorValue { .. } => {}
    }
}
