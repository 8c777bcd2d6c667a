use crate::ast::{Block, Expr, TypeNode};
use crate::codegen::context::{GeneratorContext, LocalVar, LoopLabels};
use crate::codegen::error::CodegenError;
use crate::codegen::expressions::{infer_type, is_pointer, lower_expr};
use crate::codegen::types::CSpelling;
use crate::codegen::util::safe;

use super::block::emit_block;

pub fn emit_if(
    ctx: &mut GeneratorContext<'_>,
    condition: &Expr,
    then_block: &Block,
    else_block: Option<&Block>,
) -> Result<(), CodegenError> {
    let cond_text = lower_expr(ctx, condition)?;
    ctx.emit_line(&format!("if ({cond_text}) {{"));
    ctx.indent_level += 1;
    emit_block(ctx, then_block)?;
    ctx.indent_level -= 1;
    if let Some(else_b) = else_block {
        ctx.emit_line("} else {");
        ctx.indent_level += 1;
        emit_block(ctx, else_b)?;
        ctx.indent_level -= 1;
    }
    ctx.emit_line("}");
    Ok(())
}

pub fn emit_while(ctx: &mut GeneratorContext<'_>, condition: &Expr, body: &Block) -> Result<(), CodegenError> {
    let cond_text = lower_expr(ctx, condition)?;
    ctx.emit_line(&format!("while ({cond_text}) {{"));
    ctx.indent_level += 1;
    ctx.loop_stack.push(dummy_loop_labels(ctx));
    emit_block(ctx, body)?;
    ctx.loop_stack.pop();
    ctx.indent_level -= 1;
    ctx.emit_line("}");
    Ok(())
}

/// `for binding in iterable` lowers to an index-based C `for`:
/// array and slice iterables both index through the element; `by_ref`
/// binds a pointer to each element instead of a copy.
pub fn emit_for(
    ctx: &mut GeneratorContext<'_>,
    binding: &str,
    by_ref: bool,
    iterable: &Expr,
    body: &Block,
) -> Result<(), CodegenError> {
    let iterable_ty = infer_type(ctx, iterable);
    let iterable_text = lower_expr(ctx, iterable)?;
    let iterable_is_ptr = is_pointer(ctx, iterable);
    let accessor = if iterable_is_ptr { "->" } else { "." };

    let (element_ty, is_slice) = match &iterable_ty {
        Some(TypeNode::Array { element, .. }) => (Some((**element).clone()), false),
        Some(TypeNode::Slice { element, .. }) => (Some((**element).clone()), true),
        _ => (None, false),
    };

    let len_expr = if is_slice {
        format!("{iterable_text}{accessor}len")
    } else {
        format!("(sizeof({iterable_text}) / sizeof({iterable_text}[0]))")
    };
    let ptr_expr = if is_slice {
        format!("{iterable_text}{accessor}ptr")
    } else {
        iterable_text
    };

    let idx = ctx.fresh_label("i");
    ctx.emit_line(&format!(
        "for (size_t {idx} = 0; {idx} < {len_expr}; {idx}++) {{"
    ));
    ctx.indent_level += 1;

    let element_spelling = element_ty.as_ref().map(|t| ctx.lower_type(t));
    let elem_c = element_spelling
        .as_ref()
        .map(|s| s.base.clone())
        .unwrap_or_else(|| {
            log::warn!("could not determine element type for 'for {binding} in ...'; assuming int32_t");
            "int32_t".to_string()
        });
    let binding_name = safe(binding);
    let saved_locals_len = ctx.local_variables.len();
    if by_ref {
        ctx.emit_line(&format!("{elem_c} *{binding_name} = &{ptr_expr}[{idx}];"));
        let ast_type = element_ty.map(|t| TypeNode::Pointer {
            inner: Box::new(t),
            is_ffi_pointer: false,
            span: crate::ast::Span::synthetic(),
        });
        ctx.push_local(LocalVar {
            name: binding_name,
            c_type: format!("{elem_c} *"),
            ast_type,
        });
    } else if element_spelling.as_ref().is_some_and(CSpelling::is_array) {
        // The element type is itself an array (iterating an array of
        // arrays): C has no whole-array `=`, so declare the binding and
        // copy the element in with `memcpy`.
        let declarator = element_spelling.as_ref().unwrap().declare(&binding_name);
        ctx.emit_line(&format!("{declarator};"));
        ctx.emit_line(&format!(
            "memcpy({binding_name}, {ptr_expr}[{idx}], sizeof({binding_name}));"
        ));
        ctx.push_local(LocalVar {
            name: binding_name,
            c_type: elem_c,
            ast_type: element_ty,
        });
    } else {
        ctx.emit_line(&format!("{elem_c} {binding_name} = {ptr_expr}[{idx}];"));
        ctx.push_local(LocalVar {
            name: binding_name,
            c_type: elem_c,
            ast_type: element_ty,
        });
    }

    ctx.loop_stack.push(dummy_loop_labels(ctx));
    emit_block(ctx, body)?;
    ctx.loop_stack.pop();
    ctx.local_variables.truncate(saved_locals_len);

    ctx.indent_level -= 1;
    ctx.emit_line("}");
    Ok(())
}

/// `break`/`continue` lower to native C keywords (both `while` and the
/// index-based `for` give them the right target without an explicit goto),
/// so these labels are unused placeholders kept only so a future construct
/// needing a named jump target (e.g. labelled break) has somewhere to hook in.
fn dummy_loop_labels(ctx: &mut GeneratorContext<'_>) -> LoopLabels {
    let label = ctx.fresh_label("loop");
    LoopLabels {
        cond_label: format!("{label}_cond"),
        end_label: format!("{label}_end"),
        increment_label: format!("{label}_incr"),
    }
}
