//! # C99 lowering backend
//!
//! Nine components run in a fixed order over one [`Program`](crate::ast::Program):
//! utilities (C1), the string pool (C2), type lowering (C3), aggregate
//! emission (C4), function emission (C5), expression lowering (C6),
//! statement lowering (C7), global emission (C8), and this module, the
//! orchestrator (C9), which sequences the rest and owns [`generate`].

pub mod aggregates;
pub mod context;
pub mod error;
pub mod expressions;
pub mod functions;
pub mod globals;
mod prescan;
pub mod statements;
pub mod string_pool;
pub mod types;
pub mod util;

pub use error::CodegenError;

use crate::ast::Program;
use context::GeneratorContext;

/// Lowers `program` to a complete C99 translation unit.
///
/// `emit_line_directives` controls whether `#line` directives referencing
/// the original source are written — on by default, off
/// for the hash-stability tests in this crate's own test suite, where a
/// stable diff matters more than debugger friendliness.
pub fn generate(program: &Program, emit_line_directives: bool) -> Result<String, CodegenError> {
    if program.decls.is_empty() {
        log::warn!("program has no top-level declarations; emitting a header-only translation unit");
    }

    let mut ctx = GeneratorContext::new(program, emit_line_directives);

    emit_header(&mut ctx);

    string_pool::collect_string_constants(&mut ctx);
    string_pool::emit_string_constants(&mut ctx);

    aggregates::emit_enum_definitions(&mut ctx);
    aggregates::emit_struct_forward_declarations(&mut ctx);
    aggregates::emit_struct_definitions(&mut ctx);

    // Force discovery of every wrapper type referenced only from a function
    // signature or body, so the single wrapper-struct drain below sees them
    // too.
    prescan::prescan_types(&mut ctx);
    aggregates::emit_pending_wrapper_structs(&mut ctx);

    aggregates::emit_interface_types(&mut ctx);

    functions::emit_function_prototypes(&mut ctx);
    aggregates::emit_vtable_constants(&mut ctx);

    globals::emit_globals(&mut ctx)?;

    functions::emit_function_definitions(&mut ctx)?;

    emit_c_main(&mut ctx);

    Ok(ctx.output)
}

/// Wires up the real C `main`: calls
/// `bridge_init(argc, argv)` then the renamed `uya_main`, translating its
/// return value (void / integer / error-union) into a process exit code.
/// Emitted only when the source actually declared a `main` function.
fn emit_c_main(ctx: &mut GeneratorContext<'_>) {
    let Some(main_decl) = ctx.registries.free_fns.get("main").cloned() else {
        return;
    };
    ctx.emit_line("int main(int argc, char **argv)");
    ctx.emit_line("{");
    ctx.indent_level += 1;
    ctx.emit_line("bridge_init(argc, argv);");
    match &main_decl.return_type {
        t if t.is_void() => {
            ctx.emit_line("uya_main();");
            ctx.emit_line("return 0;");
        }
        crate::ast::TypeNode::ErrorUnion { .. } => {
            let c_type = ctx.lower_type(&main_decl.return_type).base;
            ctx.emit_line(&format!("{c_type} _uya_main_result = uya_main();"));
            ctx.emit_line("if (_uya_main_result.error_id != 0) {");
            ctx.indent_level += 1;
            ctx.emit_line("fprintf(stderr, \"unhandled error: id %u\\n\", _uya_main_result.error_id);");
            ctx.emit_line("return 1;");
            ctx.indent_level -= 1;
            ctx.emit_line("}");
            ctx.emit_line("return 0;");
        }
        _ => {
            ctx.emit_line("return (int)uya_main();");
        }
    }
    ctx.indent_level -= 1;
    ctx.emit_line("}");
}

/// The fixed preamble every translation unit gets: standard
/// headers the lowering relies on, the `uya_alignof` portable alignment
/// macro (C99 has no `_Alignof` operator — that's C11), and an `extern`
/// declaration for `bridge_init`, the runtime-support hook the generated
/// `main` calls before `uya_main`.
fn emit_header(ctx: &mut GeneratorContext<'_>) {
    ctx.emit_line("/* Generated by the uya compiler. Do not edit by hand. */");
    for header in [
        "stdio.h", "stdlib.h", "string.h", "stdint.h", "stdbool.h", "stddef.h",
    ] {
        ctx.emit_line(&format!("#include <{header}>"));
    }
    ctx.emit_line("");
    ctx.emit_line("#define uya_alignof(T) offsetof(struct { char c; T member; }, member)");
    ctx.emit_line("");
    ctx.emit_line("extern void bridge_init(int argc, char **argv);");
    ctx.emit_line("");
}
