//! # Statement emission (component C7)

mod block;
mod control_flow;
mod return_stmt;
mod var_decl;

use crate::ast::{Block, Statement, TypeNode};
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;
use crate::codegen::expressions::lower_expr;

pub use block::emit_block;

/// True when `block`, or any `if`/`while`/`for`/nested block inside it,
/// contains a `defer` or `errdefer` statement. Drives the choice between
/// the plain-`return` lowering (nothing to replay) and the goto-based
/// check/error/normal epilogue (LIFO replay shared by every exit path in
/// the function).
pub fn block_has_defer(block: &Block) -> bool {
    block.statements.iter().any(stmt_has_defer)
}

fn stmt_has_defer(stmt: &Statement) -> bool {
    match stmt {
        Statement::Defer { .. } | Statement::ErrDefer { .. } => true,
        Statement::If {
            then_block,
            else_block,
            ..
        } => block_has_defer(then_block) || else_block.as_ref().is_some_and(block_has_defer),
        Statement::While { body, .. } | Statement::For { body, .. } => block_has_defer(body),
        Statement::Block(b) => block_has_defer(b),
        _ => false,
    }
}

/// Emits a function's body.
///
/// When the body has no `defer`/`errdefer` anywhere, statements lower
/// straight through and every `return` emits a plain C `return`. When it
/// does, `return` instead stores into `_uya_ret` and jumps to a shared
/// epilogue emitted here after the body: a `_check_error_return_<fn>`/
/// `_error_return_<fn>`/`_normal_return_<fn>` triple for error-union
/// returns, or a single `_normal_return_<fn>` for everything else.
///
/// `ctx.current_uses_defer_scheme` must already be set by the caller
/// (`functions::emit_one_function`), which also declares `_uya_ret` ahead
/// of the body when it is needed — both decisions are made from the same
/// `block_has_defer` check, before any statement text is emitted.
pub fn emit_function_body(ctx: &mut GeneratorContext<'_>, body: &Block) -> Result<(), CodegenError> {
    block::emit_block(ctx, body)?;

    if !ctx.current_uses_defer_scheme {
        return Ok(());
    }

    let fn_name = ctx.current_function_decl.clone().unwrap_or_default();
    let return_type = ctx.current_function_return_type.clone();
    let is_error_union = matches!(return_type, Some(TypeNode::ErrorUnion { .. }));
    let is_void = return_type.as_ref().is_some_and(TypeNode::is_void);

    // Fallthrough (control reaches the end of the body without an explicit
    // `return`) is itself an exit path and must hit the same epilogue.
    let falls_through = !matches!(body.statements.last(), Some(Statement::Return { .. }));
    if falls_through {
        if is_error_union {
            ctx.emit_line(&format!("goto _check_error_return_{fn_name};"));
        } else {
            ctx.emit_line(&format!("goto _normal_return_{fn_name};"));
        }
    }

    if is_error_union {
        ctx.emit_line(&format!("_check_error_return_{fn_name}:"));
        ctx.emit_line("if (_uya_ret.error_id != 0) {");
        ctx.indent_level += 1;
        ctx.emit_line(&format!("goto _error_return_{fn_name};"));
        ctx.indent_level -= 1;
        ctx.emit_line("} else {");
        ctx.indent_level += 1;
        ctx.emit_line(&format!("goto _normal_return_{fn_name};"));
        ctx.indent_level -= 1;
        ctx.emit_line("}");

        ctx.emit_line(&format!("_error_return_{fn_name}:"));
        ctx.indent_level += 1;
        let errdefers = ctx.errdefer_stack.clone();
        for block in errdefers.iter().rev() {
            block::emit_block(ctx, block)?;
        }
        let defers = ctx.defer_stack.clone();
        for block in defers.iter().rev() {
            block::emit_block(ctx, block)?;
        }
        ctx.emit_line("return _uya_ret;");
        ctx.indent_level -= 1;
    }

    ctx.emit_line(&format!("_normal_return_{fn_name}:"));
    ctx.indent_level += 1;
    let defers = ctx.defer_stack.clone();
    for block in defers.iter().rev() {
        block::emit_block(ctx, block)?;
    }
    ctx.emit_line(if is_void { "return;" } else { "return _uya_ret;" });
    ctx.indent_level -= 1;

    Ok(())
}

fn emit_stmt(ctx: &mut GeneratorContext<'_>, stmt: &Statement) -> Result<(), CodegenError> {
    let span = stmt.span().clone();
    ctx.emit_source_line(span.line as i64, &span.filename);
    match stmt {
        Statement::Expr(e) => {
            let text = lower_expr(ctx, e)?;
            ctx.emit_line(&format!("{text};"));
            Ok(())
        }
        Statement::Return { value, .. } => return_stmt::emit_return(ctx, value),
        Statement::If {
            condition,
            then_block,
            else_block,
            ..
        } => control_flow::emit_if(ctx, condition, then_block, else_block.as_ref()),
        Statement::While { condition, body, .. } => control_flow::emit_while(ctx, condition, body),
        Statement::For {
            binding,
            by_ref,
            iterable,
            body,
            ..
        } => control_flow::emit_for(ctx, binding, *by_ref, iterable, body),
        Statement::Break { .. } => {
            ctx.emit_line("break;");
            Ok(())
        }
        Statement::Continue { .. } => {
            ctx.emit_line("continue;");
            Ok(())
        }
        // Collected, not executed here; replayed LIFO at the owning
        // function's exit paths.
        Statement::Defer { body, .. } => {
            ctx.defer_stack.push(body.clone());
            Ok(())
        }
        Statement::ErrDefer { body, .. } => {
            ctx.errdefer_stack.push(body.clone());
            Ok(())
        }
        Statement::Block(b) => block::emit_block(ctx, b),
        Statement::VarDecl(v) => var_decl::emit_var_decl(ctx, v),
    }
}

/// Builds the `(struct err_union_X){ .error_id = ..., .value = ... }`
/// compound literal an error-union-typed return or variable initializer
/// needs.
pub(super) fn wrap_error_union_value(
    ctx: &mut GeneratorContext<'_>,
    payload: &TypeNode,
    union_c_type: &str,
    init_expr: &crate::ast::Expr,
) -> Result<String, CodegenError> {
    if let crate::ast::Expr::ErrorValue { name, span } = init_expr {
        return match ctx.error_id(name) {
            Ok(id) => Ok(format!("({union_c_type}){{ .error_id = {id}u }}")),
            Err(err) => {
                log::error!("{}", crate::codegen::error::diagnostic(span, &err));
                Err(err)
            }
        };
    }
    if payload.is_void() {
        return Ok(format!("({union_c_type}){{ .error_id = 0 }}"));
    }
    let value_text = lower_expr(ctx, init_expr)?;
    Ok(format!("({union_c_type}){{ .error_id = 0, .value = {value_text} }}"))
}
