//! Best-effort AST-type inference for expressions already in scope.
//!
//! There is no typechecker upstream of this crate:
//! the emitter only needs to answer two narrow questions — "is this a
//! pointer?" (for `.`-vs-`->` and pointer-to-array indexing) and "is this a
//! struct/union value?" (for memcmp-based equality) — both answerable from
//! the declared types already sitting in scope, without full inference.

use crate::ast::{Expr, TypeNode, UnaryOp};
use crate::codegen::context::GeneratorContext;

/// Recovers the declared type of `expr`, when it can be read straight off a
/// local/global/field declaration, a literal, or a unary ref/deref. Returns
/// `None` when the answer would require real type inference (e.g. the
/// result type of an arbitrary function call).
pub fn infer_type(ctx: &GeneratorContext<'_>, expr: &Expr) -> Option<TypeNode> {
    match expr {
        Expr::Ident { name, .. } => {
            if let Some(local) = ctx.find_local(name) {
                return local.ast_type.clone();
            }
            if let Some(global) = ctx.find_global(name) {
                return Some(global.ast_type.clone());
            }
            None
        }
        Expr::Unary { op, operand, .. } => match op {
            UnaryOp::Ref => {
                let inner = infer_type(ctx, operand)?;
                Some(TypeNode::Pointer {
                    inner: Box::new(inner),
                    is_ffi_pointer: false,
                    span: expr.span().clone(),
                })
            }
            UnaryOp::Deref => match infer_type(ctx, operand)? {
                TypeNode::Pointer { inner, .. } => Some(*inner),
                _ => None,
            },
            _ => None,
        },
        Expr::MemberAccess { object, field, .. } => {
            let object_ty = infer_type(ctx, object)?;
            let struct_name = named_struct_of(&object_ty)?;
            let fields = ctx.struct_fields(&struct_name)?;
            fields.iter().find(|f| &f.name == field).map(|f| f.ty.clone())
        }
        Expr::ArrayAccess { array, .. } => match infer_type(ctx, array)? {
            TypeNode::Array { element, .. } => Some(*element),
            TypeNode::Pointer { inner, .. } => match *inner {
                TypeNode::Array { element, .. } => Some(*element),
                other => Some(other),
            },
            _ => None,
        },
        Expr::Cast { target, .. } => Some(target.clone()),
        Expr::StructInit { struct_name, type_args, span, .. } => Some(TypeNode::Named {
            name: struct_name.clone(),
            type_args: type_args.clone(),
            span: span.clone(),
        }),
        Expr::Binary { op, lhs, .. } if !op.is_equality() => infer_type(ctx, lhs),
        _ => None,
    }
}

fn named_struct_of(ty: &TypeNode) -> Option<String> {
    match ty {
        TypeNode::Named { name, .. } => Some(name.clone()),
        TypeNode::Pointer { inner, .. } => named_struct_of(inner),
        _ => None,
    }
}

/// True when `expr`'s inferred type is a pointer.
pub fn is_pointer(ctx: &GeneratorContext<'_>, expr: &Expr) -> bool {
    matches!(infer_type(ctx, expr), Some(TypeNode::Pointer { .. }))
}

/// True when `expr`'s inferred type names a struct or a tagged/extern union
///.
pub fn is_aggregate(ctx: &GeneratorContext<'_>, expr: &Expr) -> bool {
    match infer_type(ctx, expr) {
        Some(TypeNode::Named { name, .. }) => {
            ctx.registries.structs.contains_key(&name) || ctx.registries.unions.contains_key(&name)
        }
        _ => false,
    }
}
