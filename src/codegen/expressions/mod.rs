//! # Expression lowering (component C6)
//!
//! Every expression lowers to a single parenthesised C expression string.
//! A few forms (string interpolation) need supporting statements; those are
//! emitted directly into the context's output by the lowering function
//! itself, ahead of the expression text it returns, which is safe because
//! lowering always happens from inside an already-open statement context.

mod access;
mod calls;
mod infer;

pub use access::{struct_init_field_body, struct_init_field_body_with_fixups};
pub use infer::{infer_type, is_aggregate, is_pointer};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;

/// Lowers `expr` to a fully-parenthesised C expression.
pub fn lower_expr(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    match expr {
        Expr::IntLiteral { value, .. } => Ok(value.to_string()),
        Expr::FloatLiteral { value, .. } => Ok(format_float(*value)),
        Expr::BoolLiteral { value, .. } => Ok(if *value { "true".to_string() } else { "false".to_string() }),
        Expr::StringLiteral { value, .. } => Ok(ctx.intern_string(value)),
        Expr::NullLiteral { .. } => Ok("NULL".to_string()),
        Expr::Ident { name, .. } => Ok(crate::codegen::util::safe(name)),
        Expr::Binary { op, lhs, rhs, .. } => lower_binary(ctx, *op, lhs, rhs),
        Expr::Unary { op, operand, .. } => lower_unary(ctx, *op, operand),
        Expr::MemberAccess { .. } => access::lower_member_access(ctx, expr),
        Expr::ArrayAccess { .. } => access::lower_array_access(ctx, expr),
        Expr::SliceExpr { .. } => access::lower_slice_expr(ctx, expr),
        Expr::StructInit { .. } => access::lower_struct_init(ctx, expr),
        Expr::ArrayLiteral { elements, .. } => access::lower_array_literal(ctx, elements),
        Expr::Sizeof { .. } => calls::lower_sizeof(ctx, expr),
        Expr::Len { operand, .. } => calls::lower_len(ctx, operand),
        Expr::Alignof { operand, .. } => calls::lower_alignof(ctx, operand),
        Expr::Cast { .. } => calls::lower_cast(ctx, expr),
        Expr::Call { .. } => calls::lower_call(ctx, expr),
        Expr::Assign { .. } => calls::lower_assign(ctx, expr),
        Expr::StringInterp { .. } => calls::lower_string_interp(ctx, expr),
        Expr::ErrorValue { .. } => calls::lower_error_value(ctx, expr),
    }
}

fn format_float(v: f64) -> String {
    if v.fract() == 0.0 && v.is_finite() {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

fn lower_binary(
    ctx: &mut GeneratorContext<'_>,
    op: BinaryOp,
    lhs: &Expr,
    rhs: &Expr,
) -> Result<String, CodegenError> {
    // Struct/union equality lowers to `memcmp`: these aggregate
    // types have no C `==`.
    if op.is_equality() && (infer::is_aggregate(ctx, lhs) || infer::is_aggregate(ctx, rhs)) {
        let l = lower_expr(ctx, lhs)?;
        let r = lower_expr(ctx, rhs)?;
        let cmp = format!("(memcmp(&({l}), &({r}), sizeof({l})) == 0)");
        return Ok(if op == BinaryOp::Ne {
            format!("(!{cmp})")
        } else {
            cmp
        });
    }
    let l = lower_expr(ctx, lhs)?;
    let r = lower_expr(ctx, rhs)?;
    Ok(format!("({l} {} {r})", op.as_c_str()))
}

fn lower_unary(ctx: &mut GeneratorContext<'_>, op: UnaryOp, operand: &Expr) -> Result<String, CodegenError> {
    let inner = lower_expr(ctx, operand)?;
    Ok(match op {
        UnaryOp::Neg => format!("(-{inner})"),
        UnaryOp::Not => format!("(!{inner})"),
        UnaryOp::BitNot => format!("(~{inner})"),
        UnaryOp::Ref => format!("(&{inner})"),
        UnaryOp::Deref => format!("(*{inner})"),
    })
}
