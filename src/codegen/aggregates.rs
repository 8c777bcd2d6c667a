//! # Aggregate emission (component C4)
//!
//! Struct/enum/union declarations, forward declarations, tagged-union
//! wrappers, and interface value structs / v-tables. Each function here
//! corresponds to one numbered phase of the orchestrator's fixed emission
//! order; `crate::codegen::mod` calls them in that order.

use crate::ast::{Decl, UnionKind};
use crate::codegen::context::{DefStatus, GeneratorContext};
use crate::codegen::util::safe;

/// Phase 2: all enum definitions, variants in source order. A variant with
/// an explicit value is rendered `Name = N`; later variants without one
/// continue from it per ordinary C enum rules.
pub fn emit_enum_definitions(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::EnumDecl(e) = decl else { continue };
        if ctx.enum_status.get(&e.name) == Some(&DefStatus::Defined) {
            continue;
        }
        let mangled = safe(&e.name);
        if e.variants.is_empty() {
            log::warn!(
                "enum '{}' has no variants; emitting an (ill-formed in strict C99) empty enum",
                e.name
            );
        }
        ctx.emit_line(&format!("enum {mangled} {{"));
        ctx.indent_level += 1;
        for (i, variant) in e.variants.iter().enumerate() {
            let comma = if i + 1 == e.variants.len() { "" } else { "," };
            match variant.value {
                Some(v) => ctx.emit_line(&format!("{} = {v}{comma}", safe(&variant.name))),
                None => ctx.emit_line(&format!("{}{comma}", safe(&variant.name))),
            }
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");
        ctx.enum_status.insert(e.name.clone(), DefStatus::Defined);
    }
}

/// Phase 3: forward declarations for every struct name, so cyclic struct
/// graphs (`struct Node { next: &Node }`) are legal C.
pub fn emit_struct_forward_declarations(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::StructDecl(s) = decl else { continue };
        if !s.type_params.is_empty() {
            // Generic structs have no single C name; their instantiations
            // are forward-declared implicitly when first emitted.
            continue;
        }
        let mangled = safe(&s.name);
        ctx.emit_line(&format!("struct {mangled};"));
        ctx.struct_status.insert(s.name.clone(), DefStatus::Declared);
    }
}

/// Phase 4: full struct definitions. Empty structs are padded with
/// `char _empty;`.
pub fn emit_struct_definitions(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::StructDecl(s) = decl else { continue };
        if !s.type_params.is_empty() {
            continue;
        }
        if ctx.struct_status.get(&s.name) == Some(&DefStatus::Defined) {
            continue;
        }
        let mangled = safe(&s.name);
        ctx.emit_line(&format!("struct {mangled} {{"));
        ctx.indent_level += 1;
        if s.fields.is_empty() {
            ctx.emit_line("char _empty;");
        } else {
            for field in &s.fields {
                let spelling = ctx.lower_type(&field.ty);
                ctx.emit_line(&format!("{};", spelling.declare(&safe(&field.name))));
            }
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");
        ctx.struct_status.insert(s.name.clone(), DefStatus::Defined);
    }

    emit_union_definitions(ctx);
}

fn emit_union_definitions(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::UnionDecl(u) = decl else { continue };
        let mangled = safe(&u.name);
        ctx.emit_line(&format!("union {mangled} {{"));
        ctx.indent_level += 1;
        for variant in &u.variants {
            let spelling = ctx.lower_type(&variant.ty);
            ctx.emit_line(&format!("{};", spelling.declare(&safe(&variant.name))));
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");

        if u.kind == UnionKind::Tagged {
            ctx.emit_line(&format!("struct uya_tagged_{mangled} {{"));
            ctx.indent_level += 1;
            ctx.emit_line("int _tag;");
            ctx.emit_line(&format!("union {mangled} u;"));
            ctx.indent_level -= 1;
            ctx.emit_line("};");
        }
    }
}

/// Phase 5: slice/wrapper/error-union struct definitions queued by the
/// type-lowering pass while struct/enum/union definitions were emitted
///.
pub fn emit_pending_wrapper_structs(ctx: &mut GeneratorContext<'_>) {
    let slice_queue = std::mem::take(&mut ctx.slice_queue);
    for (name, element_c_type) in slice_queue {
        ctx.emit_line(&format!("struct {name} {{"));
        ctx.indent_level += 1;
        ctx.emit_line(&format!("{element_c_type} *ptr;"));
        ctx.emit_line("size_t len;");
        ctx.indent_level -= 1;
        ctx.emit_line("};");
    }

    let monomorphised = std::mem::take(&mut ctx.pending_monomorphised_structs);
    for block in monomorphised {
        for line in block.lines() {
            ctx.emit_line(line);
        }
    }

    let error_unions = std::mem::take(&mut ctx.pending_error_unions);
    for (name, payload) in error_unions {
        ctx.emit_line(&format!("struct {name} {{"));
        ctx.indent_level += 1;
        ctx.emit_line("uint32_t error_id;");
        if let Some(payload) = payload {
            ctx.emit_line(&format!("{};", payload.declare("value")));
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");
    }

    let array_wrappers = std::mem::take(&mut ctx.pending_array_wrappers);
    for (name, element_c_type, n) in array_wrappers {
        ctx.emit_line(&format!("struct {name} {{"));
        ctx.indent_level += 1;
        ctx.emit_line(&format!("{element_c_type} data[{n}];"));
        ctx.indent_level -= 1;
        ctx.emit_line("};");
    }
}

/// Phase 6: interface value structs (`uya_interface_I`, the `(vtable,
/// data)` fat pointer) and v-table *type* declarations — before
/// prototypes, since the v-table struct only names method signatures, not
/// the implementers.
pub fn emit_interface_types(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    for decl in &decls {
        let Decl::InterfaceDecl(iface) = decl else { continue };
        let mangled = safe(&iface.name);
        ctx.emit_line(&format!("struct uya_interface_{mangled} {{"));
        ctx.indent_level += 1;
        ctx.emit_line("void *vtable;");
        ctx.emit_line("void *data;");
        ctx.indent_level -= 1;
        ctx.emit_line("};");

        let methods = ctx.registries.resolve_interface_methods(&iface.name);
        ctx.emit_line(&format!("struct uya_vtable_{mangled} {{"));
        ctx.indent_level += 1;
        for m in &methods {
            let ret = ctx.lower_type(&m.return_type).base;
            let mut params = vec!["void *self".to_string()];
            for p in m.params.iter().skip(1) {
                params.push(ctx.lower_type(&p.ty).base);
            }
            ctx.emit_line(&format!(
                "{ret} (*{})({});",
                safe(&m.name),
                params.join(", ")
            ));
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");
    }
}

/// Phase 8: v-table *constants*, one per (interface, implementer) pair,
/// emitted after function prototypes so method names resolve.
pub fn emit_vtable_constants(ctx: &mut GeneratorContext<'_>) {
    let decls = ctx.program_root.decls.clone();
    let implements: Vec<(String, String)> = decls
        .iter()
        .filter_map(|decl| match decl {
            Decl::MethodBlock(m) => m.implements.clone().map(|iface| (m.struct_name.clone(), iface)),
            _ => None,
        })
        .collect();
    for (struct_name, interface_name) in implements {
        let methods = ctx.registries.resolve_interface_methods(&interface_name);
        let iface_mangled = safe(&interface_name);
        let struct_mangled = safe(&struct_name);
        ctx.emit_line(&format!(
            "static const struct uya_vtable_{iface_mangled} uya_vtable_{iface_mangled}_{struct_mangled} = {{"
        ));
        ctx.indent_level += 1;
        for (i, m) in methods.iter().enumerate() {
            let ret = ctx.lower_type(&m.return_type).base;
            let mut param_types = vec!["void *self".to_string()];
            for p in m.params.iter().skip(1) {
                param_types.push(ctx.lower_type(&p.ty).base);
            }
            let comma = if i + 1 == methods.len() { "" } else { "," };
            ctx.emit_line(&format!(
                "({ret} (*)({}))&uya_{struct_mangled}_{}{comma}",
                param_types.join(", "),
                safe(&m.name)
            ));
        }
        ctx.indent_level -= 1;
        ctx.emit_line("};");
    }
}
