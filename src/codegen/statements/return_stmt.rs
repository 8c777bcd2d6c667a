use crate::ast::{Expr, TypeNode};
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;
use crate::codegen::expressions::lower_expr;

use super::wrap_error_union_value;

/// `return expr?;`.
///
/// Two lowerings, chosen by `ctx.current_uses_defer_scheme` (set once per
/// function by `emit_function_body`): a function with no `defer`/`errdefer`
/// emits a direct C `return`; one that does stores the value into
/// `_uya_ret` and jumps to the shared epilogue instead, so every exit path
/// replays the same LIFO defer chain exactly once.
pub fn emit_return(ctx: &mut GeneratorContext<'_>, value: &Option<Expr>) -> Result<(), CodegenError> {
    if ctx.current_uses_defer_scheme {
        emit_return_via_epilogue(ctx, value)
    } else {
        emit_return_direct(ctx, value)
    }
}

/// Stores the value into `_uya_ret`, then returns it directly — used whenever the function has no `defer`/`errdefer` to
/// replay and so needs no shared epilogue.
fn emit_return_direct(ctx: &mut GeneratorContext<'_>, value: &Option<Expr>) -> Result<(), CodegenError> {
    let return_type = ctx.current_function_return_type.clone();
    match (&return_type, value) {
        (Some(TypeNode::ErrorUnion { payload, .. }), Some(expr)) => {
            let union_c_type = ctx.lower_type(&TypeNode::ErrorUnion {
                payload: payload.clone(),
                span: expr.span().clone(),
            });
            let wrapped = wrap_error_union_value(ctx, payload, &union_c_type.base, expr)?;
            ctx.emit_line(&format!("_uya_ret = {wrapped};"));
            ctx.emit_line("return _uya_ret;");
        }
        (Some(TypeNode::Array { .. }), Some(expr)) => {
            let wrapped = lower_array_return_value(ctx, &return_type, expr)?;
            ctx.emit_line(&format!("_uya_ret = {wrapped};"));
            ctx.emit_line("return _uya_ret;");
        }
        (_, Some(expr)) => {
            let text = lower_expr(ctx, expr)?;
            ctx.emit_line(&format!("_uya_ret = {text};"));
            ctx.emit_line("return _uya_ret;");
        }
        (_, None) => {
            ctx.emit_line("return;");
        }
    }
    Ok(())
}

/// Stores the return value into `_uya_ret` and jumps into the shared
/// epilogue `emit_function_body` emits after the body.
fn emit_return_via_epilogue(ctx: &mut GeneratorContext<'_>, value: &Option<Expr>) -> Result<(), CodegenError> {
    let return_type = ctx.current_function_return_type.clone();
    let fn_name = ctx.current_function_decl.clone().unwrap_or_default();

    match (&return_type, value) {
        (Some(TypeNode::ErrorUnion { payload, .. }), Some(Expr::ErrorValue { name, span })) => {
            match ctx.error_id(name) {
                Ok(id) => ctx.emit_line(&format!("_uya_ret.error_id = {id}u;")),
                Err(err) => {
                    log::error!("{}", crate::codegen::error::diagnostic(span, &err));
                    return Err(err);
                }
            }
            let _ = payload;
            ctx.emit_line(&format!("goto _check_error_return_{fn_name};"));
        }
        (Some(TypeNode::ErrorUnion { payload, .. }), Some(expr)) => {
            ctx.emit_line("_uya_ret.error_id = 0;");
            if !payload.is_void() {
                let value_text = lower_expr(ctx, expr)?;
                ctx.emit_line(&format!("_uya_ret.value = {value_text};"));
            }
            ctx.emit_line(&format!("goto _check_error_return_{fn_name};"));
        }
        (Some(TypeNode::ErrorUnion { .. }), None) => {
            ctx.emit_line("_uya_ret.error_id = 0;");
            ctx.emit_line(&format!("goto _check_error_return_{fn_name};"));
        }
        (Some(TypeNode::Array { .. }), Some(expr)) => {
            let wrapped = lower_array_return_value(ctx, &return_type, expr)?;
            ctx.emit_line(&format!("_uya_ret = {wrapped};"));
            ctx.emit_line(&format!("goto _normal_return_{fn_name};"));
        }
        (_, Some(expr)) => {
            let text = lower_expr(ctx, expr)?;
            ctx.emit_line(&format!("_uya_ret = {text};"));
            ctx.emit_line(&format!("goto _normal_return_{fn_name};"));
        }
        (_, None) => {
            ctx.emit_line(&format!("goto _normal_return_{fn_name};"));
        }
    }
    Ok(())
}

fn lower_array_return_value(
    ctx: &mut GeneratorContext<'_>,
    return_type: &Option<TypeNode>,
    expr: &Expr,
) -> Result<String, CodegenError> {
    let Some(TypeNode::Array { element, size, .. }) = return_type else {
        unreachable!("caller only invokes this for an Array return type");
    };
    let n = crate::codegen::util::eval_const(size, ctx.program_root).or_placeholder();
    let wrapper_name = ctx.lower_array_return_wrapper(element, n);
    let elem_c = ctx.lower_type(element).base;
    let data_initializer = match expr {
        Expr::ArrayLiteral { .. } => lower_expr(ctx, expr)?,
        _ => {
            let inner = lower_expr(ctx, expr)?;
            format!("*({elem_c} (*)[{n}])(&({inner}))")
        }
    };
    Ok(format!("(struct {wrapper_name}){{ .data = {data_initializer} }}"))
}
