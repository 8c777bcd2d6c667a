//! # Type lowering (component C3)

use crate::ast::{Field, StructDecl, TypeNode, UnionKind};
use crate::codegen::context::GeneratorContext;
use crate::codegen::util::safe;

/// Lowers a primitive type name to its C spelling, or `None` if `name` is
/// not one of the recognised primitives.
fn lower_primitive(name: &str) -> Option<&'static str> {
    Some(match name {
        "i8" => "int8_t",
        "i16" => "int16_t",
        "i32" => "int32_t",
        "i64" => "int64_t",
        "u8" => "uint8_t",
        "u16" => "uint16_t",
        "u32" => "uint32_t",
        "u64" => "uint64_t",
        "usize" => "size_t",
        "f32" => "float",
        "f64" => "double",
        "bool" => "bool",
        "byte" => "uint8_t",
        "void" => "void",
        _ => return None,
    })
}

/// Mangles a generic instantiation's name: `Generic<A,B>` at `<X,Y>` becomes
/// `Generic_X_Y`, recursively expanding nested instantiations with `_`
/// separators and prefixing pointer arguments with `ptr_`.
pub fn mangle_instantiation(base: &str, args: &[TypeNode], ctx: &mut GeneratorContext<'_>) -> String {
    let mut name = safe(base);
    for arg in args {
        name.push('_');
        name.push_str(&mangle_type_arg(arg, ctx));
    }
    name
}

fn mangle_type_arg(ty: &TypeNode, ctx: &mut GeneratorContext<'_>) -> String {
    match ty {
        TypeNode::Pointer { inner, .. } => format!("ptr_{}", mangle_type_arg(inner, ctx)),
        TypeNode::Named { name, type_args, .. } => {
            if type_args.is_empty() {
                safe(name)
            } else {
                mangle_instantiation(name, type_args, ctx)
            }
        }
        TypeNode::Array { element, .. } => format!("arr_{}", mangle_type_arg(element, ctx)),
        TypeNode::Slice { element, .. } => format!("slice_{}", mangle_type_arg(element, ctx)),
        TypeNode::Tuple { elements, .. } => {
            let parts: Vec<_> = elements.iter().map(|e| mangle_type_arg(e, ctx)).collect();
            format!("tuple_{}", parts.join("_"))
        }
        TypeNode::ErrorUnion { payload, .. } => format!("err_{}", mangle_type_arg(payload, ctx)),
        TypeNode::Atomic { inner, .. } => format!("atomic_{}", mangle_type_arg(inner, ctx)),
    }
}

/// Turns a C type spelling with an optional array suffix (`Tc` or
/// `Tc[N]`/`Tc[N1][N2]`) into its two pieces, for contexts that need to
/// splice an identifier between the base spelling and the array brackets
///.
#[derive(Debug, Clone)]
pub struct CSpelling {
    /// The base type, e.g. `int32_t`, `struct Point`, `struct Point *`.
    pub base: String,
    /// Array dimensions to splice after the declared identifier, e.g.
    /// `[3]` or `[2][4]`. Empty for non-array types.
    pub array_suffix: String,
}

impl CSpelling {
    pub fn plain(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            array_suffix: String::new(),
        }
    }

    pub fn is_array(&self) -> bool {
        !self.array_suffix.is_empty()
    }

    /// Renders `base name array_suffix`, the shape every declarator in the
    /// statement emitter needs.
    pub fn declare(&self, name: &str) -> String {
        if self.array_suffix.is_empty() {
            format!("{} {}", self.base, name)
        } else {
            format!("{} {}{}", self.base, name, self.array_suffix)
        }
    }
}

impl GeneratorContext<'_> {
    /// `Tc` for a struct/enum/union/interface name, applying `safe()` and the
    /// `struct `/`enum `/`union ` prefix rules.
    fn lower_named_aggregate(&mut self, name: &str) -> Option<String> {
        let mangled = safe(name);
        if self.registries.enums.contains_key(name) {
            Some(format!("enum {mangled}"))
        } else if self.registries.interfaces.contains_key(name) {
            Some(format!("struct uya_interface_{mangled}"))
        } else if let Some(u) = self.registries.unions.get(name).cloned() {
            Some(match u.kind {
                UnionKind::Extern => format!("union {mangled}"),
                UnionKind::Tagged => format!("struct uya_tagged_{mangled}"),
            })
        } else if self.registries.structs.contains_key(name) {
            Some(format!("struct {mangled}"))
        } else {
            None
        }
    }

    /// `Self`-substitution for method parameter 0: `*Self` ->
    /// `struct S *` (no const), `&Self` -> `const struct S *`, by-value
    /// `Self` -> `struct S` (or `struct uya_tagged_S` for a tagged union).
    fn substitute_self(&mut self, struct_name: &str) -> String {
        let mangled = safe(struct_name);
        if let Some(u) = self.registries.unions.get(struct_name) {
            match u.kind {
                UnionKind::Tagged => format!("struct uya_tagged_{mangled}"),
                UnionKind::Extern => format!("union {mangled}"),
            }
        } else {
            format!("struct {mangled}")
        }
    }

    /// Lowers a source type to its C spelling. This is the
    /// single entry point every other component calls; it is
    /// self-memoizing only in the sense that repeated calls with structurally
    /// equal input produce the same string — there is
    /// no cache, since string construction here is cheap and the side
    /// effects (queueing slice/error-union/monomorphisation emission) must
    /// still happen every time a *new* instantiation is first seen, which
    /// the `emitted_*` sets already guard.
    pub fn lower_type(&mut self, ty: &TypeNode) -> CSpelling {
        match ty {
            TypeNode::Named { name, type_args, .. } => self.lower_named(name, type_args),
            TypeNode::Pointer {
                inner,
                is_ffi_pointer,
                ..
            } => self.lower_pointer(inner, *is_ffi_pointer),
            TypeNode::Array { element, size, .. } => self.lower_array(element, size),
            TypeNode::Slice { element, .. } => CSpelling::plain(self.lower_slice(element)),
            TypeNode::Tuple { elements, .. } => CSpelling::plain(self.lower_tuple(elements)),
            TypeNode::ErrorUnion { payload, .. } => CSpelling::plain(self.lower_error_union(payload)),
            TypeNode::Atomic { inner, .. } => {
                let inner_c = self.lower_type(inner);
                CSpelling::plain(format!("_Atomic({})", inner_c.base))
            }
        }
    }

    fn lower_named(&mut self, name: &str, type_args: &[TypeNode]) -> CSpelling {
        if name == "Self" {
            if let Some(struct_name) = self.current_method_struct_name.clone() {
                return CSpelling::plain(self.substitute_self(&struct_name));
            }
        }
        if type_args.is_empty() {
            if let Some(prim) = lower_primitive(name) {
                return CSpelling::plain(prim);
            }
            if let Some(spelling) = self.lower_named_aggregate(name) {
                return CSpelling::plain(spelling);
            }
            // Type parameter in scope of the current monomorphisation
            //.
            if let Some(pos) = self.current_type_params.iter().position(|p| p == name) {
                if let Some(arg) = self.current_type_args.get(pos).cloned() {
                    return self.lower_type(&arg);
                }
            }
            // Unknown name: emit as a best-effort struct reference rather
            // than panicking.
            log::warn!("unknown type name '{name}'; assuming it names a struct");
            return CSpelling::plain(format!("struct {}", safe(name)));
        }

        let mangled = mangle_instantiation(name, type_args, self);
        self.ensure_monomorphisation(name, type_args, &mangled);
        CSpelling::plain(format!("struct {mangled}"))
    }

    /// Emits the struct definition for a generic instantiation the first
    /// time it is requested. Field-type recursion emits dependent
    /// instantiations before the enclosing one, so e.g. `Box<Pair<i32,i32>>`
    /// gets `Pair_i32_i32`'s body emitted before `Box_Pair_i32_i32`'s.
    fn ensure_monomorphisation(&mut self, base: &str, args: &[TypeNode], mangled: &str) {
        if self.emitted_monomorphizations.contains(mangled) {
            return;
        }
        let Some(decl) = self.registries.structs.get(base).cloned() else {
            return;
        };
        self.emitted_monomorphizations.insert(mangled.to_string());

        let saved_params = std::mem::replace(&mut self.current_type_params, decl.type_params.clone());
        let saved_args = std::mem::replace(&mut self.current_type_args, args.to_vec());

        let mut field_lines = Vec::new();
        for field in &decl.fields {
            let spelling = self.lower_type(&field.ty);
            field_lines.push(format!("    {};", spelling.declare(&safe(&field.name))));
        }

        self.current_type_params = saved_params;
        self.current_type_args = saved_args;

        let mut out = format!("struct {mangled} {{\n");
        if field_lines.is_empty() {
            out.push_str("    char _empty;\n");
        } else {
            for line in field_lines {
                out.push_str(&line);
                out.push('\n');
            }
        }
        out.push_str("};\n");
        self.pending_monomorphised_structs.push(out);
    }

    fn lower_pointer(&mut self, inner: &TypeNode, _is_ffi_pointer: bool) -> CSpelling {
        // Pointer-to-array needs the `Tc (*)[N]` spelling.
        if let TypeNode::Array { element, size, .. } = inner {
            let elem = self.lower_type(element);
            let n = crate::codegen::util::eval_const(size, self.program_root).or_placeholder();
            return CSpelling::plain(format!("{} (*)[{n}]", elem.base));
        }
        let inner_spelling = self.lower_type(inner);
        CSpelling::plain(format!("{} *", inner_spelling.base))
    }

    fn lower_array(&mut self, element: &TypeNode, size: &crate::ast::Expr) -> CSpelling {
        let elem = self.lower_type(element);
        let n = crate::codegen::util::eval_const(size, self.program_root).or_placeholder();
        let n = if n <= 0 { 1 } else { n };
        if elem.is_array() {
            // Multi-dimensional: outer dimension first.
            CSpelling {
                base: elem.base,
                array_suffix: format!("[{n}]{}", elem.array_suffix),
            }
        } else {
            CSpelling {
                base: elem.base,
                array_suffix: format!("[{n}]"),
            }
        }
    }

    /// Registers (and, eventually, emits) the slice wrapper struct for
    /// element type `element`, returning its C spelling. The actual struct body is emitted lazily by the aggregate
    /// emitter (component C4) the first time it drains `slice_queue`.
    pub fn lower_slice(&mut self, element: &TypeNode) -> String {
        let elem = self.lower_type(element);
        let suffix = sanitise_for_identifier(&elem.base);
        let name = format!("uya_slice_{suffix}");
        if self.emitted_slices.insert(name.clone()) {
            self.slice_queue.push((name.clone(), elem.base.clone()));
        }
        format!("struct {name}")
    }

    fn lower_tuple(&mut self, elements: &[TypeNode]) -> String {
        let mut out = String::from("struct { ");
        for (i, el) in elements.iter().enumerate() {
            let spelling = self.lower_type(el);
            out.push_str(&spelling.declare(&format!("f{i}")));
            out.push_str("; ");
        }
        out.push('}');
        out
    }

    /// Registers the `err_union_<Tc>` wrapper for payload type `payload`,
    /// returning its C spelling.
    pub fn lower_error_union(&mut self, payload: &TypeNode) -> String {
        if payload.is_void() {
            let name = "err_union_void".to_string();
            if self.emitted_error_unions.insert(name.clone()) {
                self.pending_error_unions
                    .push((name.clone(), None));
            }
            return format!("struct {name}");
        }
        let elem = self.lower_type(payload);
        let suffix = sanitise_for_identifier(&elem.base);
        let name = format!("err_union_{suffix}");
        if self.emitted_error_unions.insert(name.clone()) {
            self.pending_error_unions.push((name.clone(), Some(elem)));
        }
        format!("struct {name}")
    }

    /// Registers the `uya_array_<T>_<N>` wrapper C99 needs for
    /// array-returning functions.
    pub fn lower_array_return_wrapper(&mut self, element: &TypeNode, n: i64) -> String {
        let elem = self.lower_type(element);
        let suffix = sanitise_for_identifier(&elem.base);
        let name = format!("uya_array_{suffix}_{n}");
        if self.emitted_array_wrappers.insert(name.clone()) {
            self.pending_array_wrappers.push((name.clone(), elem.base.clone(), n));
        }
        name
    }

    /// Conservative ABI size estimate: four bytes per field, deliberately approximate. Used only to
    /// decide whether an `extern` function parameter of struct type should
    /// cross the ABI by pointer.
    pub fn estimate_struct_size(&self, decl: &StructDecl) -> usize {
        decl.fields.len() * 4
    }

    pub fn struct_fields(&self, name: &str) -> Option<Vec<Field>> {
        self.registries.structs.get(name).map(|s| s.fields.clone())
    }
}

/// Turns a C type spelling into something usable inside a C identifier
///.
pub fn sanitise_for_identifier(spelling: &str) -> String {
    spelling
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect::<String>()
        .trim_matches('_')
        .to_string()
        .replace("__", "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Program, Span};

    fn ctx(program: &Program) -> GeneratorContext<'_> {
        GeneratorContext::new(program, true)
    }

    #[test]
    fn primitives_lower_directly() {
        let program = Program::default();
        let mut c = ctx(&program);
        let spelling = c.lower_type(&TypeNode::Named {
            name: "i32".into(),
            type_args: vec![],
            span: Span::synthetic(),
        });
        assert_eq!(spelling.base, "int32_t");
    }

    #[test]
    fn slice_type_registers_for_lazy_emission() {
        let program = Program::default();
        let mut c = ctx(&program);
        let name = c.lower_slice(&TypeNode::named("i32"));
        assert_eq!(name, "struct uya_slice_int32_t");
        assert_eq!(c.slice_queue.len(), 1);
        // idempotent: asking again does not queue twice.
        let _ = c.lower_slice(&TypeNode::named("i32"));
        assert_eq!(c.slice_queue.len(), 1);
    }
}
