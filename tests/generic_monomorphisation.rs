//! Generic struct instantiations are mangled deterministically and
//! monomorphised lazily, with a nested instantiation's body emitted before
//! the struct that contains it.

mod support;
use support::*;

use uya::ast::{Decl, TypeNode};

fn generic_ty(name: &str, args: Vec<TypeNode>) -> TypeNode {
    TypeNode::Named {
        name: name.to_string(),
        type_args: args,
        span: sp(),
    }
}

#[test]
fn nested_instantiation_is_mangled_and_ordered_before_its_container() {
    let pair = struct_decl(
        "Pair",
        vec!["T", "U"],
        vec![field("a", named("T")), field("b", named("U"))],
    );
    let boxed = struct_decl("Box", vec!["T"], vec![field("value", named("T"))]);

    let nested = generic_ty("Box", vec![generic_ty("Pair", vec![named("i32"), named("i32")])]);
    let use_box = fn_decl("use_box", vec![param("b", nested)], named("i32"), vec![ret(Some(int_lit(0)))]);

    let prog = program(vec![
        Decl::StructDecl(pair),
        Decl::StructDecl(boxed),
        Decl::FnDecl(use_box),
    ]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("struct Pair_i32_i32 {"));
    assert!(c.contains("struct Box_Pair_i32_i32 {"));
    assert!(c.contains("int32_t a;"));
    assert!(c.contains("int32_t b;"));
    assert!(c.contains("struct Pair_i32_i32 value;"));

    // No unparametrised `struct Pair`/`struct Box` definition is ever emitted.
    assert!(!c.contains("struct Pair {"));
    assert!(!c.contains("struct Box {"));

    let pair_pos = c.find("struct Pair_i32_i32 {").unwrap();
    let box_pos = c.find("struct Box_Pair_i32_i32 {").unwrap();
    assert!(pair_pos < box_pos, "the dependent instantiation must be emitted first");

    assert!(c.contains("int32_t use_box(struct Box_Pair_i32_i32 b)"));
}
