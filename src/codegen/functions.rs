//! # Function emission (component C5)

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::ast::{Decl, FnDecl, Param, TypeNode};
use crate::codegen::context::{FunctionScopeGuard, GeneratorContext, LocalVar};
use crate::codegen::error::CodegenError;
use crate::codegen::util::safe;

/// Recognised C standard-library functions: these are not
/// forward-declared (their header already provides the declaration) and,
/// for these only, a `*byte` parameter lowers to `const char *` to suppress
/// `-Wpointer-sign`.
static RECOGNISED_STDLIB_FNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // stdio.h
        "printf", "fprintf", "sprintf", "snprintf", "puts", "putchar", "fputs", "fputc",
        "fopen", "fclose", "fread", "fwrite", "fseek", "ftell", "fflush", "fgets", "fgetc",
        "scanf", "fscanf", "perror",
        // string.h
        "strlen", "strcpy", "strncpy", "strcmp", "strncmp", "strcat", "strncat", "strchr",
        "strrchr", "strstr", "strtok", "memcpy", "memmove", "memcmp", "memset",
        // stdlib.h memory ops
        "malloc", "calloc", "realloc", "free", "exit", "abort", "atoi", "atol", "atof",
    ]
    .into_iter()
    .collect()
});

pub fn is_recognised_stdlib_fn(name: &str) -> bool {
    RECOGNISED_STDLIB_FNS.contains(name)
}

/// Renames the source `main` to `uya_main` and drops its parameter list
///.
pub fn mangle_fn_name(name: &str) -> String {
    if name == "main" {
        "uya_main".to_string()
    } else {
        safe(name)
    }
}

pub fn mangle_method_name(struct_name: &str, method: &str) -> String {
    format!("uya_{}_{}", safe(struct_name), safe(method))
}

/// Phase 7: function prototypes for free functions and for every method, in
/// declaration order. `extern` is added when the declaration has no body
/// and is not a recognised stdlib function.
pub fn emit_function_prototypes(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        match decl {
            Decl::FnDecl(f) => emit_one_prototype(ctx, f, None),
            Decl::MethodBlock(m) => {
                for method in &m.methods {
                    emit_one_prototype(ctx, method, Some(m.struct_name.clone()));
                }
            }
            _ => {}
        }
    }
}

fn emit_one_prototype(ctx: &mut GeneratorContext<'_>, f: &FnDecl, struct_name: Option<String>) {
    if !f.type_params.is_empty() {
        // Generic free functions are monomorphised at call sites; skip the
        // unparametrised prototype (mirrors struct monomorphisation).
        return;
    }
    let c_name = match &struct_name {
        Some(s) => mangle_method_name(s, &f.name),
        None => mangle_fn_name(&f.name),
    };
    let is_recognised = struct_name.is_none() && is_recognised_stdlib_fn(&f.name);
    if is_recognised {
        return;
    }

    let saved_method_struct = ctx.current_method_struct_name.take();
    ctx.current_method_struct_name = struct_name.clone();
    let ret = lower_return_type(ctx, f);
    let params = lower_params_for_signature(ctx, f, struct_name.is_some(), false);
    ctx.current_method_struct_name = saved_method_struct;

    let storage = if f.body.is_none() { "extern " } else { "" };
    let param_list = if params.is_empty() {
        "void".to_string()
    } else {
        params.join(", ")
    };
    ctx.emit_line(&format!("{storage}{ret} {c_name}({param_list});"));
}

fn lower_return_type(ctx: &mut GeneratorContext<'_>, f: &FnDecl) -> String {
    if let TypeNode::Array { element, size, .. } = &f.return_type {
        let n = crate::codegen::util::eval_const(size, ctx.program_root).or_placeholder();
        return format!("struct {}", ctx.lower_array_return_wrapper(element, n));
    }
    ctx.lower_type(&f.return_type).base
}

/// Renders every parameter's C declarator, applying the array/slice/
/// large-struct ABI nuances. `is_extern` controls the
/// large-struct-by-pointer rule, which only applies to extern functions.
fn lower_params_for_signature(
    ctx: &mut GeneratorContext<'_>,
    f: &FnDecl,
    is_method: bool,
    is_extern_override: bool,
) -> Vec<String> {
    let is_extern = is_extern_override || f.body.is_none();
    let mut out = Vec::new();
    for (i, param) in f.params.iter().enumerate() {
        if is_method && i == 0 {
            // Receiver: `Self`/`&Self`/`*Self` substitution already happens
            // inside `lower_type` via `current_method_struct_name`.
            let spelling = ctx.lower_type(&param.ty);
            out.push(spelling.declare(&safe(&param.name)));
            continue;
        }
        out.push(lower_one_param(ctx, param, is_extern));
    }
    out
}

fn lower_one_param(ctx: &mut GeneratorContext<'_>, param: &Param, is_extern: bool) -> String {
    match &param.ty {
        TypeNode::Array { .. } => {
            // Array parameters are renamed `<name>_param` at the prototype;
            // the function body declares a true local array and memcpy's
            // into it.
            let spelling = ctx.lower_type(&param.ty);
            spelling.declare(&format!("{}_param", safe(&param.name)))
        }
        TypeNode::Slice { element, .. } => {
            let slice_c_type = ctx.lower_slice(element);
            format!("{slice_c_type} *{}", safe(&param.name))
        }
        TypeNode::Pointer { inner, .. } if is_extern && is_recognised_pointee_byte(inner) => {
            format!("const char *{}", safe(&param.name))
        }
        TypeNode::Named { type_args, .. } if type_args.is_empty() && is_extern => {
            if extern_call_arg_needs_address(ctx, &param.ty) {
                let spelling = ctx.lower_type(&param.ty);
                return format!("{} *{}", spelling.base, safe(&param.name));
            }
            let spelling = ctx.lower_type(&param.ty);
            spelling.declare(&safe(&param.name))
        }
        _ => {
            let spelling = ctx.lower_type(&param.ty);
            spelling.declare(&safe(&param.name))
        }
    }
}

fn is_recognised_pointee_byte(inner: &TypeNode) -> bool {
    matches!(inner, TypeNode::Named { name, .. } if name == "byte")
}

/// True when this named-struct argument, passed to an `extern` function,
/// needs `&` inserted at the call site because its estimated size exceeds
/// 16 bytes.
pub fn extern_call_arg_needs_address(ctx: &GeneratorContext<'_>, ty: &TypeNode) -> bool {
    if let TypeNode::Named { name, type_args, .. } = ty {
        if type_args.is_empty() {
            if let Some(decl) = ctx.registries.structs.get(name) {
                return ctx.estimate_struct_size(decl) > 16;
            }
        }
    }
    false
}

/// Phase 10: function bodies, in declaration order.
pub fn emit_function_definitions(ctx: &mut GeneratorContext<'_>) -> Result<(), CodegenError> {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        match decl {
            Decl::FnDecl(f) => {
                if f.body.is_some() && f.type_params.is_empty() {
                    emit_one_function(ctx, f, None)?;
                }
            }
            Decl::MethodBlock(m) => {
                for method in &m.methods {
                    if method.body.is_some() {
                        emit_one_function(ctx, method, Some(m.struct_name.clone()))?;
                    }
                }
                maybe_emit_synthesized_drop(ctx, m)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn emit_one_function(
    ctx: &mut GeneratorContext<'_>,
    f: &FnDecl,
    struct_name: Option<String>,
) -> Result<(), CodegenError> {
    let guard = FunctionScopeGuard::enter(ctx);
    let result = emit_function_body_inner(ctx, f, struct_name);
    guard.restore(ctx);
    result
}

fn emit_function_body_inner(
    ctx: &mut GeneratorContext<'_>,
    f: &FnDecl,
    struct_name: Option<String>,
) -> Result<(), CodegenError> {
    ctx.current_method_struct_name = struct_name.clone();
    ctx.current_function_return_type = Some(f.return_type.clone());
    let c_name = match &struct_name {
        Some(s) => mangle_method_name(s, &f.name),
        None => mangle_fn_name(&f.name),
    };
    ctx.current_function_decl = Some(c_name.clone());

    let ret = lower_return_type(ctx, f);
    let is_method = struct_name.is_some();
    let param_decls = lower_params_for_signature(ctx, f, is_method, false);

    // Populate the local-variable table with the parameters, so member
    // access / array-ness lookups inside the body resolve correctly.
    for (i, param) in f.params.iter().enumerate() {
        if is_method && i == 0 {
            let spelling = ctx.lower_type(&param.ty);
            ctx.push_local(LocalVar {
                name: safe(&param.name),
                c_type: spelling.base,
                ast_type: Some(param.ty.clone()),
            });
            continue;
        }
        let spelling = ctx.lower_type(&param.ty);
        ctx.push_local(LocalVar {
            name: safe(&param.name),
            c_type: spelling.base,
            ast_type: Some(param.ty.clone()),
        });
    }

    let param_list = if param_decls.is_empty() {
        "void".to_string()
    } else {
        param_decls.join(", ")
    };
    ctx.emit_line(&format!("{ret} {c_name}({param_list})"));
    ctx.emit_line("{");
    ctx.indent_level += 1;

    if let Some(body) = &f.body {
        ctx.emit_source_line(body.span.line as i64, &body.span.filename);
        // Array parameters need a true local copy, filled via memcpy from
        // the renamed `_param` prototype argument.
        for param in &f.params {
            if let TypeNode::Array { .. } = &param.ty {
                let spelling = ctx.lower_type(&param.ty);
                let name = safe(&param.name);
                ctx.emit_line(&format!("{};", spelling.declare(&name)));
                ctx.emit_line(&format!(
                    "memcpy({name}, {name}_param, sizeof({name}));"
                ));
            }
        }

        // Every `return`-with-a-value stores into `_uya_ret` before
        // returning it, deferred or not. Whether that second step is a
        // bare `return _uya_ret;` or a `goto` into the shared
        // check/error/normal epilogue is decided once, up front, from the
        // same check the epilogue itself uses: functions with nothing to
        // replay skip the epilogue; everything else gets it.
        if let Some(decl) = ret_var_declaration(ctx, f) {
            ctx.emit_line(&format!("{decl};"));
        }
        ctx.current_uses_defer_scheme = crate::codegen::statements::block_has_defer(body);

        crate::codegen::statements::emit_function_body(ctx, body)?;
    }

    ctx.indent_level -= 1;
    ctx.emit_line("}");
    Ok(())
}

/// The `_uya_ret` declarator the goto-epilogue scheme needs, or `None` for a `void` return — there is nothing to carry across
/// the `goto` in that case.
fn ret_var_declaration(ctx: &mut GeneratorContext<'_>, f: &FnDecl) -> Option<String> {
    if f.return_type.is_void() {
        return None;
    }
    if let TypeNode::Array { element, size, .. } = &f.return_type {
        let n = crate::codegen::util::eval_const(size, ctx.program_root).or_placeholder();
        let wrapper = ctx.lower_array_return_wrapper(element, n);
        return Some(format!("struct {wrapper} _uya_ret"));
    }
    let spelling = ctx.lower_type(&f.return_type);
    Some(spelling.declare("_uya_ret"))
}

/// Synthesizes a `drop` method for a struct that needs one (walks fields in
/// reverse declaration order, calling `uya_F_drop` for each field whose
/// type declares a `drop` method) when the source did not provide one
/// itself.
fn maybe_emit_synthesized_drop(
    ctx: &mut GeneratorContext<'_>,
    m: &crate::ast::MethodBlock,
) -> Result<(), CodegenError> {
    if m.methods.iter().any(|method| method.name == "drop") {
        return Ok(());
    }
    let Some(fields) = ctx.struct_fields(&m.struct_name) else {
        return Ok(());
    };
    let needs_drop: Vec<_> = fields
        .iter()
        .rev()
        .filter(|field| field_type_has_drop(ctx, &field.ty))
        .cloned()
        .collect();
    if needs_drop.is_empty() {
        return Ok(());
    }

    let struct_mangled = safe(&m.struct_name);
    let c_name = mangle_method_name(&m.struct_name, "drop");
    ctx.emit_line(&format!(
        "void {c_name}(struct {struct_mangled} *self)"
    ));
    ctx.emit_line("{");
    ctx.indent_level += 1;
    for field in &needs_drop {
        if let TypeNode::Named { name, .. } = &field.ty {
            ctx.emit_line(&format!(
                "uya_{}_drop(&self->{});",
                safe(name),
                safe(&field.name)
            ));
        }
    }
    ctx.indent_level -= 1;
    ctx.emit_line("}");
    Ok(())
}

fn field_type_has_drop(ctx: &GeneratorContext<'_>, ty: &TypeNode) -> bool {
    if let TypeNode::Named { name, .. } = ty {
        if let Some(methods) = ctx.registries.methods.get(name) {
            return methods.iter().any(|m| m.name == "drop");
        }
    }
    false
}
