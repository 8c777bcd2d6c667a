//! Struct field access through a pointer receiver, and a global struct
//! initializer with no compound-literal prefix.

mod support;
use support::*;

use uya::ast::Decl;

#[test]
fn pointer_member_access_lowers_to_arrow_and_direct_return() {
    let point = struct_decl(
        "Point",
        vec![],
        vec![field("x", named("i32")), field("y", named("i32"))],
    );

    let get_x = fn_decl(
        "get_x",
        vec![param("p", ptr(named("Point")))],
        named("i32"),
        vec![ret(Some(member(ident("p"), "x")))],
    );

    let prog = program(vec![Decl::StructDecl(point), Decl::FnDecl(get_x)]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("int32_t get_x(struct Point * p)"));
    assert!(c.contains("_uya_ret = p->x;"));
    assert!(c.contains("return _uya_ret;"));
    // No goto/epilogue machinery: this function has no defer/errdefer.
    assert!(!c.contains("goto _normal_return_get_x"));
}

#[test]
fn global_struct_initializer_has_no_compound_literal_prefix() {
    let point = struct_decl(
        "Point",
        vec![],
        vec![field("x", named("i32")), field("y", named("i32"))],
    );
    let global = var_decl(
        "global_point",
        named("Point"),
        false,
        Some(struct_init("Point", vec![], vec![("x", int_lit(0)), ("y", int_lit(0))])),
    );

    let prog = program(vec![Decl::StructDecl(point), Decl::VarDecl(global)]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("struct Point global_point = { .x = 0, .y = 0 };"));
    assert!(!c.contains("(struct Point){"));
}
