//! # Global variable emission (component C8)
//!
//! Globals share the local-declaration initializer forks (array-from-
//! literal vs. array-from-identifier, error-union wrapping) but forbid the
//! compound-literal cast prefix a local initializer uses: strict C99 does
//! not accept `(struct X){...}` as a *static* initializer, only a bare
//! brace list does. Globals also have no statement context to run a
//! follow-up `memcpy` in, unlike local declarations: an array field (or a
//! whole array) initialized from a non-literal expression has no valid
//! static-initializer form at all and degrades to a placeholder with a
//! logged warning.

use crate::ast::{Decl, Expr, TypeNode};
use crate::codegen::context::{GeneratorContext, GlobalVar};
use crate::codegen::error::CodegenError;
use crate::codegen::expressions::{lower_expr, struct_init_field_body};
use crate::codegen::util::safe;

pub fn emit_globals(ctx: &mut GeneratorContext<'_>) -> Result<(), CodegenError> {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::VarDecl(v) = decl else { continue };
        let spelling = ctx.lower_type(&v.ty);
        let name = safe(&v.name);
        let storage = if v.is_const { "const " } else { "" };

        match &v.init {
            None => {
                ctx.emit_line(&format!("{storage}{};", spelling.declare(&name)));
            }
            Some(init_expr) => {
                let init_text = lower_global_initializer(ctx, &v.ty, init_expr)?;
                ctx.emit_line(&format!("{storage}{} = {init_text};", spelling.declare(&name)));
            }
        }

        ctx.global_variables.push(GlobalVar {
            name,
            c_type: spelling.base,
            ast_type: v.ty.clone(),
        });
    }
    Ok(())
}

fn lower_global_initializer(
    ctx: &mut GeneratorContext<'_>,
    ty: &TypeNode,
    init: &Expr,
) -> Result<String, CodegenError> {
    match (ty, init) {
        (TypeNode::ErrorUnion { payload, .. }, _) => wrap_error_union_value_bare(ctx, payload, init),
        (TypeNode::Array { .. }, Expr::ArrayLiteral { .. }) => lower_expr(ctx, init),
        (TypeNode::Array { .. }, _) => {
            log::warn!(
                "global array initialized from a non-literal expression has no static-initializer form in C99; emitting it verbatim, which will not compile as-is"
            );
            lower_expr(ctx, init)
        }
        (_, Expr::StructInit { .. }) => struct_init_field_body(ctx, init),
        _ => lower_expr(ctx, init),
    }
}

/// Same payload-wrapping logic as the local-declaration helper, but
/// without the `(struct err_union_X)` cast prefix a static initializer
/// can't carry.
fn wrap_error_union_value_bare(
    ctx: &mut GeneratorContext<'_>,
    payload: &TypeNode,
    init_expr: &Expr,
) -> Result<String, CodegenError> {
    if let Expr::ErrorValue { name, span } = init_expr {
        return match ctx.error_id(name) {
            Ok(id) => Ok(format!("{{ .error_id = {id}u }}")),
            Err(err) => {
                log::error!("{}", crate::codegen::error::diagnostic(span, &err));
                Err(err)
            }
        };
    }
    if payload.is_void() {
        return Ok("{ .error_id = 0 }".to_string());
    }
    let value_text = lower_expr(ctx, init_expr)?;
    Ok(format!("{{ .error_id = 0, .value = {value_text} }}"))
}
