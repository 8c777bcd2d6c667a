//! Member access, indexing, slicing, struct/array literals.

use crate::ast::{Expr, TypeNode};
use crate::codegen::context::GeneratorContext;
use crate::codegen::error::CodegenError;
use crate::codegen::util::safe;

use super::{infer, lower_expr};

/// `object.field` / `object->field`, or `EnumName.Variant`:
/// when `object` is a bare identifier naming a registered enum, this is an
/// enum-constant reference and lowers to the bare (mangled) variant name,
/// since C enum constants live in the enclosing scope, not the enum's.
pub fn lower_member_access(
    ctx: &mut GeneratorContext<'_>,
    expr: &Expr,
) -> Result<String, CodegenError> {
    let Expr::MemberAccess { object, field, .. } = expr else {
        unreachable!()
    };
    if let Expr::Ident { name, .. } = object.as_ref() {
        if ctx.registries.enums.contains_key(name) {
            return Ok(safe(field));
        }
    }
    let object_text = lower_expr(ctx, object)?;
    let op = if infer::is_pointer(ctx, object) { "->" } else { "." };
    Ok(format!("{object_text}{op}{}", safe(field)))
}

/// `array[index]`, with the pointer-to-array dereference C requires
/// (`(*arr)[i]` for a `&[N]T` parameter).
pub fn lower_array_access(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::ArrayAccess { array, index, .. } = expr else {
        unreachable!()
    };
    let index_text = lower_expr(ctx, index)?;
    let is_ptr_to_array = matches!(
        infer::infer_type(ctx, array),
        Some(TypeNode::Pointer { inner, .. }) if matches!(*inner, TypeNode::Array { .. })
    );
    let array_text = lower_expr(ctx, array)?;
    if is_ptr_to_array {
        Ok(format!("(*{array_text})[{index_text}]"))
    } else {
        Ok(format!("{array_text}[{index_text}]"))
    }
}

/// `array[start..end]`: constructs a slice value as a compound
/// literal `(struct uya_slice_T){ .ptr = &array[start], .len = end - start }`.
pub fn lower_slice_expr(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::SliceExpr {
        array, start, end, ..
    } = expr
    else {
        unreachable!()
    };
    let element_ty = match infer::infer_type(ctx, array) {
        Some(TypeNode::Array { element, .. }) => *element,
        Some(TypeNode::Slice { element, .. }) => *element,
        other => other.unwrap_or_else(|| TypeNode::named("void")),
    };
    let slice_c_type = ctx.lower_slice(&element_ty);

    let array_text = lower_expr(ctx, array)?;
    let start_text = match start {
        Some(s) => lower_expr(ctx, s)?,
        None => "0".to_string(),
    };
    let end_text = match end {
        Some(e) => lower_expr(ctx, e)?,
        None => format!("(sizeof({array_text}) / sizeof({array_text}[0]))"),
    };
    Ok(format!(
        "({slice_c_type}){{ .ptr = &{array_text}[{start_text}], .len = ({end_text}) - ({start_text}) }}"
    ))
}

/// `Struct { field: value, ... }`: a designated-initializer
/// compound literal. An array-typed field initialized from a plain
/// identifier can't be copied with a bare `=` in C, so it goes through the
/// pointer-cast-and-dereference trick instead of a brace list.
pub fn lower_struct_init(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let Expr::StructInit {
        struct_name,
        type_args,
        ..
    } = expr
    else {
        unreachable!()
    };

    let c_type = if type_args.is_empty() {
        format!("struct {}", safe(struct_name))
    } else {
        ctx.lower_type(&TypeNode::Named {
            name: struct_name.clone(),
            type_args: type_args.clone(),
            span: expr.span().clone(),
        })
        .base
    };

    let body = struct_init_field_body(ctx, expr)?;
    Ok(format!("({c_type}){body}"))
}

/// The bare `{ .field = value, ... }` designated-initializer body of a
/// struct literal, with no leading `(struct X)` compound-literal cast.
/// Globals need this form: strict C99 forbids compound literals in static
/// initializers, so this is also what `emit_globals` (component C8) calls
/// directly. An array-typed field initialized from a non-literal expression
/// has no designated-initializer form at all in C (arrays aren't
/// assignable, brace or not); callers with no statement context to recover
/// in land here and get a zero placeholder plus a warning. Callers that can
/// follow the declaration with a `memcpy` should call
/// [`struct_init_field_body_with_fixups`] instead.
pub fn struct_init_field_body(ctx: &mut GeneratorContext<'_>, expr: &Expr) -> Result<String, CodegenError> {
    let (body, fixups) = struct_init_field_body_with_fixups(ctx, expr)?;
    for (field, _) in &fixups {
        log::warn!(
            "struct field '{field}' is an array initialized from a non-literal expression; it has no designated-initializer form in C, emitting a zero placeholder instead"
        );
    }
    Ok(body)
}

/// Same designated-initializer body as [`struct_init_field_body`], but an
/// array-typed field initialized from a non-literal expression is left as
/// the zero placeholder `{0}` and reported back as a `(field_name,
/// source_expr)` pair instead of warned away: the caller is expected to
/// emit `memcpy(&name.field, source, sizeof(name.field))` for each pair
/// right after the declaration.
pub fn struct_init_field_body_with_fixups(
    ctx: &mut GeneratorContext<'_>,
    expr: &Expr,
) -> Result<(String, Vec<(String, String)>), CodegenError> {
    let Expr::StructInit {
        struct_name, fields, ..
    } = expr
    else {
        unreachable!()
    };
    let field_decls = ctx.struct_fields(struct_name);
    let mut parts = Vec::with_capacity(fields.len());
    let mut fixups = Vec::new();
    for (name, value) in fields {
        let field_ty = field_decls
            .as_ref()
            .and_then(|fs| fs.iter().find(|f| &f.name == name))
            .map(|f| f.ty.clone());
        let value_text = match (&field_ty, value) {
            (Some(TypeNode::Array { .. }), value) if !matches!(value, Expr::ArrayLiteral { .. }) => {
                let source = lower_expr(ctx, value)?;
                fixups.push((name.clone(), source));
                "{0}".to_string()
            }
            _ => lower_expr(ctx, value)?,
        };
        parts.push(format!(".{} = {value_text}", safe(name)));
    }
    Ok((format!("{{ {} }}", parts.join(", ")), fixups))
}

/// `[a, b, c]`: a plain brace-enclosed compound-literal body,
/// valid wherever a brace initializer is (array field values, `var x = []`).
pub fn lower_array_literal(
    ctx: &mut GeneratorContext<'_>,
    elements: &[Expr],
) -> Result<String, CodegenError> {
    let mut parts = Vec::with_capacity(elements.len());
    for e in elements {
        parts.push(lower_expr(ctx, e)?);
    }
    Ok(format!("{{ {} }}", parts.join(", ")))
}
