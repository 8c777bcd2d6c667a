use crate::ast::{Expr, LocalVarDecl, TypeNode};
use crate::codegen::context::{GeneratorContext, LocalVar};
use crate::codegen::error::CodegenError;
use crate::codegen::expressions::{lower_expr, struct_init_field_body_with_fixups};
use crate::codegen::util::safe;

use super::wrap_error_union_value;

/// `let`/`const` local declarations,
/// with five initializer paths: no initializer, an array from a brace
/// literal, an array from anything else (needs `memcpy`, since C doesn't
/// allow whole-array assignment from an identifier), a struct literal with
/// one or more array fields initialized from anything else (same problem,
/// one level down: the field declares as a zero placeholder and each real
/// value arrives via a follow-up `memcpy`), and an error-union value (needs
/// the `err_union_*` wrapper); everything else declares with a plain `=`.
pub fn emit_var_decl(ctx: &mut GeneratorContext<'_>, decl: &LocalVarDecl) -> Result<(), CodegenError> {
    let ty = decl
        .ty
        .clone()
        .unwrap_or_else(|| infer_literal_type(ctx, decl));
    let spelling = ctx.lower_type(&ty);
    let name = safe(&decl.name);

    match (&ty, &decl.init) {
        (_, None) => {
            ctx.emit_line(&format!("{};", spelling.declare(&name)));
        }
        (TypeNode::Array { .. }, Some(Expr::ArrayLiteral { .. })) => {
            let init_text = lower_expr(ctx, decl.init.as_ref().unwrap())?;
            ctx.emit_line(&format!("{} = {init_text};", spelling.declare(&name)));
        }
        (TypeNode::Array { .. }, Some(init_expr)) => {
            ctx.emit_line(&format!("{};", spelling.declare(&name)));
            let init_text = lower_expr(ctx, init_expr)?;
            ctx.emit_line(&format!("memcpy({name}, {init_text}, sizeof({name}));"));
        }
        (TypeNode::ErrorUnion { payload, .. }, Some(init_expr)) => {
            let wrapped = wrap_error_union_value(ctx, payload, &spelling.base, init_expr)?;
            ctx.emit_line(&format!("{} = {wrapped};", spelling.declare(&name)));
        }
        (_, Some(init_expr @ Expr::StructInit { .. })) => {
            let (body, fixups) = struct_init_field_body_with_fixups(ctx, init_expr)?;
            ctx.emit_line(&format!("{} = {body};", spelling.declare(&name)));
            for (field, source) in fixups {
                let field = safe(&field);
                ctx.emit_line(&format!(
                    "memcpy({name}.{field}, {source}, sizeof({name}.{field}));"
                ));
            }
        }
        (_, Some(init_expr)) => {
            let init_text = lower_expr(ctx, init_expr)?;
            ctx.emit_line(&format!("{} = {init_text};", spelling.declare(&name)));
        }
    }

    ctx.push_local(LocalVar {
        name,
        c_type: spelling.base,
        ast_type: Some(ty),
    });
    Ok(())
}

/// Best-effort type recovery for a `let` with no annotation and no
/// upstream typechecker: only literal initializers
/// are recognisable this way; anything else falls back to `i32` with a
/// logged warning.
fn infer_literal_type(ctx: &GeneratorContext<'_>, decl: &LocalVarDecl) -> TypeNode {
    match &decl.init {
        Some(Expr::IntLiteral { .. }) => TypeNode::named("i32"),
        Some(Expr::FloatLiteral { .. }) => TypeNode::named("f64"),
        Some(Expr::BoolLiteral { .. }) => TypeNode::named("bool"),
        Some(Expr::StringLiteral { .. }) => TypeNode::Pointer {
            inner: Box::new(TypeNode::named("byte")),
            is_ffi_pointer: true,
            span: crate::ast::Span::synthetic(),
        },
        Some(other) => {
            let inferred = crate::codegen::expressions::infer_type(ctx, other);
            inferred.unwrap_or_else(|| {
                log::warn!(
                    "local '{}' has no declared type and its initializer's type could not be inferred; defaulting to i32",
                    decl.name
                );
                TypeNode::named("i32")
            })
        }
        None => {
            log::warn!(
                "local '{}' has neither a declared type nor an initializer; defaulting to i32",
                decl.name
            );
            TypeNode::named("i32")
        }
    }
}
