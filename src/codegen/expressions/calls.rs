//! Calls, casts, sizeof/len/alignof, assignment, interpolation, error
//! values.

use crate::ast::{Expr, SizeofOperand, TypeNode};
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;
use crate::codegen::functions::{self, is_recognised_stdlib_fn};
use crate::codegen::util::{decoded_byte_len, safe};

use super::{infer, lower_expr};

pub fn lower_call(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::Call { callee, args, .. } = expr else {
        unreachable!()
    };
    match callee.as_ref() {
        Expr::MemberAccess { object, field, .. } => lower_method_call(ctx, object, field, args),
        Expr::Ident { name, .. } => lower_free_call(ctx, name, args),
        _ => {
            let callee_text = lower_expr(ctx, callee)?;
            let mut arg_texts = Vec::with_capacity(args.len());
            for a in args {
                arg_texts.push(lower_expr(ctx, a)?);
            }
            Ok(format!("{callee_text}({})", arg_texts.join(", ")))
        }
    }
}

fn lower_free_call(
    ctx: &mut GeneratorContext<'_>,
    name: &str,
    args: &[Expr],
) -> Result<String, CodegenError> {
    let decl = ctx.registries.free_fns.get(name).cloned();
    let is_recognised = is_recognised_stdlib_fn(name);
    let is_extern = decl.as_ref().map(|f| f.body.is_none()).unwrap_or(is_recognised);
    let c_name = functions::mangle_fn_name(name);

    let mut arg_texts = Vec::with_capacity(args.len());
    for (i, arg) in args.iter().enumerate() {
        let param_ty = decl.as_ref().and_then(|f| f.params.get(i)).map(|p| p.ty.clone());
        arg_texts.push(lower_call_arg(ctx, arg, param_ty.as_ref(), is_extern, is_recognised)?);
    }
    Ok(format!("{c_name}({})", arg_texts.join(", ")))
}

fn lower_method_call(
    ctx: &mut GeneratorContext<'_>,
    object: &Expr,
    field: &str,
    args: &[Expr],
) -> Result<String, CodegenError> {
    let object_ty = infer::infer_type(ctx, object);

    if let Some(TypeNode::Named { name, .. }) = &object_ty {
        if ctx.registries.interfaces.contains_key(name) {
            let iface_mangled = safe(name);
            let object_text = lower_expr(ctx, object)?;
            let mut arg_texts = vec![format!("{object_text}.data")];
            for a in args {
                arg_texts.push(lower_expr(ctx, a)?);
            }
            return Ok(format!(
                "((struct uya_vtable_{iface_mangled} *){object_text}.vtable)->{}({})",
                safe(field),
                arg_texts.join(", ")
            ));
        }
    }

    let struct_name = match &object_ty {
        Some(TypeNode::Named { name, .. }) => Some(name.clone()),
        Some(TypeNode::Pointer { inner, .. }) => match inner.as_ref() {
            TypeNode::Named { name, .. } => Some(name.clone()),
            _ => None,
        },
        _ => None,
    };

    if let Some(struct_name) = struct_name {
        if let Some(methods) = ctx.registries.methods.get(&struct_name).cloned() {
            if let Some(method) = methods.iter().find(|m| m.name == field) {
                let receiver_is_pointer = matches!(
                    method.params.first().map(|p| &p.ty),
                    Some(TypeNode::Pointer { .. })
                );
                let object_text = lower_expr(ctx, object)?;
                let object_is_pointer = infer::is_pointer(ctx, object);
                let receiver_arg = match (receiver_is_pointer, object_is_pointer) {
                    (true, true) => object_text,
                    (true, false) => format!("(&{object_text})"),
                    (false, true) => format!("(*{object_text})"),
                    (false, false) => object_text,
                };
                let mut arg_texts = vec![receiver_arg];
                for (i, a) in args.iter().enumerate() {
                    let param_ty = method.params.get(i + 1).map(|p| p.ty.clone());
                    arg_texts.push(lower_call_arg(ctx, a, param_ty.as_ref(), false, false)?);
                }
                let c_name = functions::mangle_method_name(&struct_name, field);
                return Ok(format!("{c_name}({})", arg_texts.join(", ")));
            }
        }
    }

    log::warn!("could not resolve receiver type for method call '.{field}(...)'; emitting a best-effort direct call");
    let object_text = lower_expr(ctx, object)?;
    let mut arg_texts = vec![object_text];
    for a in args {
        arg_texts.push(lower_expr(ctx, a)?);
    }
    Ok(format!("{}({})", safe(field), arg_texts.join(", ")))
}

fn lower_call_arg(
    ctx: &mut GeneratorContext<'_>,
    arg: &Expr,
    param_ty: Option<&TypeNode>,
    is_extern: bool,
    is_recognised: bool,
) -> Result<String, CodegenError> {
    let arg_text = lower_expr(ctx, arg)?;
    match param_ty {
        Some(TypeNode::Slice { .. }) => Ok(format!("(&({arg_text}))")),
        Some(ty @ TypeNode::Named { type_args, .. }) if type_args.is_empty() && is_extern => {
            if functions::extern_call_arg_needs_address(ctx, ty) {
                Ok(format!("(&({arg_text}))"))
            } else {
                Ok(arg_text)
            }
        }
        Some(TypeNode::Pointer { inner, .. }) if is_byte_named(inner) => {
            if is_recognised {
                Ok(arg_text)
            } else if matches!(arg, Expr::StringLiteral { .. }) {
                Ok(format!("(uint8_t *)({arg_text})"))
            } else {
                Ok(arg_text)
            }
        }
        _ => Ok(arg_text),
    }
}

fn is_byte_named(ty: &TypeNode) -> bool {
    matches!(ty, TypeNode::Named { name, .. } if name == "byte")
}

/// `target = value`. Assignment is an expression, matching the
/// grammar (`Statement::Expr(Expr::Assign{..})` covers the statement form).
pub fn lower_assign(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::Assign { target, value, .. } = expr else {
        unreachable!()
    };
    let target_text = lower_expr(ctx, target)?;
    let value_text = lower_expr(ctx, value)?;
    Ok(format!("({target_text} = {value_text})"))
}

/// `as` / `as!`: both lower to a plain C cast; `as!` narrows an
/// error-union payload and carries no extra runtime check (REDESIGN: the
/// original's `as!` panic-on-mismatch is out of scope here, per SPEC's
/// decision to keep this backend a pure lowering pass).
pub fn lower_cast(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::Cast { operand, target, .. } = expr else {
        unreachable!()
    };
    let operand_text = lower_expr(ctx, operand)?;
    if let TypeNode::ErrorUnion { payload, .. } = target {
        // force-cast out of `!T`: read the payload's `.value` field.
        let _ = payload;
        let operand_is_ptr = infer::is_pointer(ctx, operand);
        let op = if operand_is_ptr { "->" } else { "." };
        return Ok(format!("{operand_text}{op}value"));
    }
    let target_c = ctx.lower_type(target).base;
    Ok(format!("(({target_c}){operand_text})"))
}

pub fn lower_sizeof(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::Sizeof { operand, .. } = expr else {
        unreachable!()
    };
    match operand {
        SizeofOperand::Type(ty) => {
            let c = ctx.lower_type(ty).base;
            Ok(format!("sizeof({c})"))
        }
        SizeofOperand::Value(v) => {
            let text = lower_expr(ctx, v)?;
            Ok(format!("sizeof({text})"))
        }
    }
}

/// `len(x)`: a fixed-size array's length is the compile-time
/// constant `sizeof(x)/sizeof(x[0])`; a slice's length is its `.len` field.
/// `len()` on a bare pointer has no statically-known length (REDESIGN /
/// Open Question: we warn and fall back to the array-style expansion).
pub fn lower_len(ctx: &mut GeneratorContext<'_>, operand: &Expr) -> Result<String, CodegenError> {
    let ty = infer::infer_type(ctx, operand);
    let text = lower_expr(ctx, operand)?;
    match ty {
        Some(TypeNode::Slice { .. }) => {
            let op = if infer::is_pointer(ctx, operand) { "->" } else { "." };
            Ok(format!("{text}{op}len"))
        }
        Some(TypeNode::Pointer { inner, .. }) if !matches!(*inner, TypeNode::Array { .. }) => {
            log::warn!("len() applied to a non-array pointer has no statically-known length; this will not produce a meaningful value");
            Ok(format!("(sizeof(*{text}) / sizeof(*{text}))"))
        }
        _ => Ok(format!("(sizeof({text}) / sizeof({text}[0]))")),
    }
}

pub fn lower_alignof(ctx: &mut GeneratorContext<'_>, ty: &TypeNode) -> Result<String, CodegenError> {
    let c = ctx.lower_type(ty).base;
    Ok(format!("uya_alignof({c})"))
}

/// `error.Name`: constructs a bare error id
/// usable wherever an integer constant of the error-union's tag slot is
/// expected; callers wrap it in the right `err_union_*` compound literal.
pub fn lower_error_value(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::ErrorValue { name, span } = expr else {
        unreachable!()
    };
    match ctx.error_id(name) {
        Ok(id) => Ok(format!("{id}u")),
        Err(err) => {
            log::error!("{}", crate::codegen::error::diagnostic(span, &err));
            Err(err)
        }
    }
}

/// String interpolation: lowers to a sequence of statements that
/// write each segment into a stack buffer sized from the interpolation
/// itself, emitted directly since interpolation can only appear where a
/// statement may precede it. A text segment's length is known at compile
/// time, so it copies in with `memcpy` sized by its *decoded* byte length
/// (an escape like `\n` is one byte, not two); a placeholder's formatted
/// width isn't known until runtime, so it still goes through `snprintf`
/// and gets a conservative reserve in the buffer's declared size. Returns
/// the buffer variable's name as the expression value.
pub fn lower_string_interp(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::StringInterp { segments, .. } = expr else {
        unreachable!()
    };

    const PLACEHOLDER_RESERVE: usize = 32;
    let mut capacity = 1; // nul terminator
    for seg in segments {
        capacity += match seg {
            crate::ast::InterpSegment::Text(text) => decoded_byte_len(text),
            crate::ast::InterpSegment::Placeholder { .. } => PLACEHOLDER_RESERVE,
        };
    }

    let buf = ctx.fresh_label("interp_buf");
    ctx.emit_line(&format!("char {buf}[{capacity}];"));
    let offset = ctx.fresh_label("interp_off");
    ctx.emit_line(&format!("size_t {offset} = 0;"));

    for seg in segments {
        match seg {
            crate::ast::InterpSegment::Text(text) => {
                let str_id = ctx.intern_string(text);
                let len = decoded_byte_len(text);
                ctx.emit_line(&format!("memcpy({buf} + {offset}, {str_id}, {len});"));
                ctx.emit_line(&format!("{offset} += {len};"));
            }
            crate::ast::InterpSegment::Placeholder { expr, format } => {
                let fmt = format.clone().unwrap_or_else(|| "%d".to_string());
                let fmt_id = ctx.intern_string(&fmt);
                let value_text = lower_expr(ctx, expr)?;
                ctx.emit_line(&format!(
                    "{offset} += (size_t)snprintf({buf} + {offset}, sizeof({buf}) - {offset}, {fmt_id}, {value_text});"
                ));
            }
        }
    }
    ctx.emit_line(&format!("{buf}[{offset}] = '\\0';"));
    Ok(buf)
}
