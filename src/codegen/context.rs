//! # Generator context
//!
//! Process-wide-per-translation-unit state. Single-owner, single-threaded
//!: the context is passed by `&mut` through the whole traversal
//! rather than shared behind interior mutability, since there is no
//! concurrency here and a plain borrow check is enough to enforce the
//! "restore on every exit path" invariant via RAII guards.

use std::collections::{HashMap, HashSet};

use crate::ast::{Decl, EnumDecl, FnDecl, InterfaceDecl, Program, StructDecl, TypeNode, UnionDecl};
use crate::codegen::error::CodegenError;
use crate::codegen::util::hash_error_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefStatus {
    Declared,
    Defined,
}

/// A local variable or parameter in scope in the function currently being
/// emitted. Carries the AST type when known so
/// member-access pointer-ness can be inferred without
/// re-deriving it from the C spelling string.
#[derive(Debug, Clone)]
pub struct LocalVar {
    pub name: String,
    pub c_type: String,
    pub ast_type: Option<TypeNode>,
}

#[derive(Debug, Clone)]
pub struct GlobalVar {
    pub name: String,
    pub c_type: String,
    pub ast_type: TypeNode,
}

/// Active loop's labels, for `break`/`continue` lowering.
#[derive(Debug, Clone)]
pub struct LoopLabels {
    pub cond_label: String,
    pub end_label: String,
    pub increment_label: String,
}

/// Declarations collected once up front. Immutable after construction except for the
/// emission-tracking sets, which the aggregate/function emitters flip as
/// they go to guarantee single-definition.
pub struct Registries {
    pub structs: HashMap<String, StructDecl>,
    pub enums: HashMap<String, EnumDecl>,
    pub unions: HashMap<String, UnionDecl>,
    pub interfaces: HashMap<String, InterfaceDecl>,
    pub free_fns: HashMap<String, FnDecl>,
    /// struct name -> methods defined on it, in declaration order.
    pub methods: HashMap<String, Vec<FnDecl>>,
}

impl Registries {
    pub fn collect(program: &Program) -> Self {
        let mut structs = HashMap::new();
        let mut enums = HashMap::new();
        let mut unions = HashMap::new();
        let mut interfaces = HashMap::new();
        let mut free_fns = HashMap::new();
        let mut methods: HashMap<String, Vec<FnDecl>> = HashMap::new();

        for decl in &program.decls {
            match decl {
                Decl::StructDecl(s) => {
                    structs.insert(s.name.clone(), s.clone());
                }
                Decl::EnumDecl(e) => {
                    enums.insert(e.name.clone(), e.clone());
                }
                Decl::UnionDecl(u) => {
                    unions.insert(u.name.clone(), u.clone());
                }
                Decl::InterfaceDecl(i) => {
                    interfaces.insert(i.name.clone(), i.clone());
                }
                Decl::FnDecl(f) => {
                    free_fns.insert(f.name.clone(), f.clone());
                }
                Decl::MethodBlock(m) => {
                    methods
                        .entry(m.struct_name.clone())
                        .or_default()
                        .extend(m.methods.iter().cloned());
                }
                Decl::VarDecl(_) => {}
            }
        }

        Self {
            structs,
            enums,
            unions,
            interfaces,
            free_fns,
            methods,
        }
    }

    /// All methods of `interface_name`'s composed interfaces followed by its
    /// own, with duplicate names suppressed by first occurrence.
    pub fn resolve_interface_methods(&self, interface_name: &str) -> Vec<crate::ast::MethodSig> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.resolve_interface_methods_into(interface_name, &mut seen, &mut out);
        out
    }

    fn resolve_interface_methods_into(
        &self,
        interface_name: &str,
        seen: &mut HashSet<String>,
        out: &mut Vec<crate::ast::MethodSig>,
    ) {
        let Some(iface) = self.interfaces.get(interface_name) else {
            return;
        };
        for parent in &iface.extends {
            self.resolve_interface_methods_into(parent, seen, out);
        }
        for m in &iface.methods {
            if seen.insert(m.name.clone()) {
                out.push(m.clone());
            }
        }
    }
}

pub struct GeneratorContext<'a> {
    pub program_root: &'a Program,
    pub registries: Registries,

    pub output: String,
    pub indent_level: usize,

    pub current_function_return_type: Option<TypeNode>,
    pub current_function_decl: Option<String>,
    pub current_method_struct_name: Option<String>,
    /// Whether the function currently being emitted needs the goto-based
    /// check/error/normal epilogue rather than a plain
    /// `return` — true exactly when its body contains at least one `defer`
    /// or `errdefer` (see `statements::block_has_defer`). Functions with
    /// nothing to replay get the simpler direct-return form.
    pub current_uses_defer_scheme: bool,

    pub current_type_params: Vec<String>,
    pub current_type_args: Vec<TypeNode>,

    pub local_variables: Vec<LocalVar>,
    pub global_variables: Vec<GlobalVar>,

    pub struct_status: HashMap<String, DefStatus>,
    pub enum_status: HashMap<String, DefStatus>,

    string_constants_order: Vec<String>,
    string_constants_ids: HashMap<String, String>,

    pub slice_queue: Vec<(String, String)>,
    pub emitted_slices: HashSet<String>,
    pub emitted_error_unions: HashSet<String>,
    pub emitted_array_wrappers: HashSet<String>,
    pub emitted_monomorphizations: HashSet<String>,

    /// Bodies queued by the type-lowering pass, drained by the aggregate
    /// emitter in emission-order phase 5: monomorphised struct
    /// definitions, `err_union_*` wrappers (name, Some(payload) or None for
    /// void), and `uya_array_<T>_<N>` wrappers.
    pub pending_monomorphised_structs: Vec<String>,
    pub pending_error_unions: Vec<(String, Option<crate::codegen::types::CSpelling>)>,
    pub pending_array_wrappers: Vec<(String, String, i64)>,

    error_names: HashMap<String, u32>,

    pub loop_stack: Vec<LoopLabels>,
    pub defer_stack: Vec<crate::ast::Block>,
    pub errdefer_stack: Vec<crate::ast::Block>,

    pub current_line: i64,
    pub current_filename: String,
    pub emit_line_directives: bool,

    label_counter: usize,
}

impl<'a> GeneratorContext<'a> {
    pub fn new(program_root: &'a Program, emit_line_directives: bool) -> Self {
        Self {
            registries: Registries::collect(program_root),
            program_root,
            output: String::new(),
            indent_level: 0,
            current_function_return_type: None,
            current_function_decl: None,
            current_method_struct_name: None,
            current_uses_defer_scheme: false,
            current_type_params: Vec::new(),
            current_type_args: Vec::new(),
            local_variables: Vec::new(),
            global_variables: Vec::new(),
            struct_status: HashMap::new(),
            enum_status: HashMap::new(),
            string_constants_order: Vec::new(),
            string_constants_ids: HashMap::new(),
            slice_queue: Vec::new(),
            emitted_slices: HashSet::new(),
            emitted_error_unions: HashSet::new(),
            emitted_array_wrappers: HashSet::new(),
            emitted_monomorphizations: HashSet::new(),
            pending_monomorphised_structs: Vec::new(),
            pending_error_unions: Vec::new(),
            pending_array_wrappers: Vec::new(),
            error_names: HashMap::new(),
            loop_stack: Vec::new(),
            defer_stack: Vec::new(),
            errdefer_stack: Vec::new(),
            current_line: 0,
            current_filename: String::new(),
            emit_line_directives,
            label_counter: 0,
        }
    }

    // -- output --------------------------------------------------------

    pub fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str("    ");
        }
    }

    pub fn emit(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn emit_line(&mut self, text: &str) {
        self.write_indent();
        self.output.push_str(text);
        self.output.push('\n');
    }

    /// `emit_line` — a `#line` directive, not an
    /// emitted line of code; named `emit_source_line` here to avoid
    /// colliding with the (unrelated) `emit_line` helper above.
    pub fn emit_source_line(&mut self, line: i64, filename: &str) {
        if !self.emit_line_directives || line <= 0 {
            return;
        }
        if self.current_line == line && self.current_filename == filename {
            return;
        }
        self.current_line = line;
        self.current_filename = filename.to_string();
        if let Some(text) = crate::codegen::util::format_line_directive(line, filename) {
            self.output.push_str(&text);
        }
    }

    // -- string pool -----------------------------------------------------

    /// Interns a literal, returning its stable `strN` identifier.
    /// Deduplicates by exact text equality.
    pub fn intern_string(&mut self, text: &str) -> String {
        if let Some(id) = self.string_constants_ids.get(text) {
            return id.clone();
        }
        let id = format!("str{}", self.string_constants_order.len());
        self.string_constants_order.push(text.to_string());
        self.string_constants_ids.insert(text.to_string(), id.clone());
        id
    }

    pub fn string_constants(&self) -> &[String] {
        &self.string_constants_order
    }

    // -- error names -------------------------------------------------------

    /// Registers (if new) and returns the 32-bit id for an error name,
    /// checking for hash collisions against every previously seen distinct
    /// name.
    pub fn error_id(&mut self, name: &str) -> Result<u32, CodegenError> {
        if let Some(id) = self.error_names.get(name) {
            return Ok(*id);
        }
        let hash = hash_error_name(name);
        for (existing_name, existing_hash) in &self.error_names {
            if *existing_hash == hash && existing_name != name {
                return Err(CodegenError::ErrorHashCollision {
                    first: existing_name.clone(),
                    second: name.to_string(),
                    hash,
                });
            }
        }
        self.error_names.insert(name.to_string(), hash);
        Ok(hash)
    }

    // -- locals ------------------------------------------------------------

    pub fn find_local(&self, name: &str) -> Option<&LocalVar> {
        self.local_variables.iter().rev().find(|v| v.name == name)
    }

    pub fn find_global(&self, name: &str) -> Option<&GlobalVar> {
        self.global_variables.iter().find(|v| v.name == name)
    }

    pub fn push_local(&mut self, local: LocalVar) {
        self.local_variables.push(local);
    }

    pub fn fresh_label(&mut self, hint: &str) -> String {
        self.label_counter += 1;
        format!("_uya_{hint}_{}", self.label_counter)
    }
}

/// RAII guard restoring the per-function context fields on drop, including
/// on an early return via `?`. Construct at function
/// emission entry; the saved state is restored automatically when the guard
/// goes out of scope, success or failure alike.
pub struct FunctionScopeGuard {
    saved_locals: Vec<LocalVar>,
    saved_return_type: Option<TypeNode>,
    saved_function_decl: Option<String>,
    saved_method_struct: Option<String>,
    saved_uses_defer_scheme: bool,
    saved_type_params: Vec<String>,
    saved_type_args: Vec<TypeNode>,
    saved_loop_stack: Vec<LoopLabels>,
    saved_defer_stack: Vec<crate::ast::Block>,
    saved_errdefer_stack: Vec<crate::ast::Block>,
    active: bool,
}

impl FunctionScopeGuard {
    pub fn enter(ctx: &mut GeneratorContext<'_>) -> Self {
        let guard = Self {
            saved_locals: std::mem::take(&mut ctx.local_variables),
            saved_return_type: ctx.current_function_return_type.take(),
            saved_function_decl: ctx.current_function_decl.take(),
            saved_method_struct: ctx.current_method_struct_name.take(),
            saved_uses_defer_scheme: std::mem::replace(&mut ctx.current_uses_defer_scheme, false),
            saved_type_params: std::mem::take(&mut ctx.current_type_params),
            saved_type_args: std::mem::take(&mut ctx.current_type_args),
            saved_loop_stack: std::mem::take(&mut ctx.loop_stack),
            saved_defer_stack: std::mem::take(&mut ctx.defer_stack),
            saved_errdefer_stack: std::mem::take(&mut ctx.errdefer_stack),
            active: true,
        };
        guard
    }

    pub fn restore(mut self, ctx: &mut GeneratorContext<'_>) {
        self.finish(ctx);
    }

    fn finish(&mut self, ctx: &mut GeneratorContext<'_>) {
        if !self.active {
            return;
        }
        self.active = false;
        ctx.local_variables = std::mem::take(&mut self.saved_locals);
        ctx.current_function_return_type = self.saved_return_type.take();
        ctx.current_function_decl = self.saved_function_decl.take();
        ctx.current_method_struct_name = self.saved_method_struct.take();
        ctx.current_uses_defer_scheme = self.saved_uses_defer_scheme;
        ctx.current_type_params = std::mem::take(&mut self.saved_type_params);
        ctx.current_type_args = std::mem::take(&mut self.saved_type_args);
        ctx.loop_stack = std::mem::take(&mut self.saved_loop_stack);
        ctx.defer_stack = std::mem::take(&mut self.saved_defer_stack);
        ctx.errdefer_stack = std::mem::take(&mut self.saved_errdefer_stack);
    }
}

// Note: `restore` takes `&mut GeneratorContext` explicitly (rather than
// implementing `Drop`) because restoring requires mutable access to the
// very context the guard was constructed from, and `Drop::drop` cannot take
// extra arguments. Every call site restores via an explicit `defer`-style
// pattern at each function-emission exit path, so each function's scratch
// state never leaks into the next one's without fighting the borrow
// checker over two live `&mut` borrows.
