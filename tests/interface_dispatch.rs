//! Interface values lower to a `(vtable, data)` fat pointer; each
//! implementer gets a static v-table constant pointing at its mangled
//! methods.

mod support;
use support::*;

use uya::ast::Decl;

#[test]
fn interface_emits_fat_pointer_vtable_type_and_constant() {
    let speaker = interface_decl(
        "Speaker",
        vec![],
        vec![method_sig("speak", vec![param("self", named("Speaker"))], named("i32"))],
    );

    let dog = struct_decl("Dog", vec![], vec![]);

    let speak = fn_decl(
        "speak",
        vec![param("self", named("Dog"))],
        named("i32"),
        vec![ret(Some(int_lit(1)))],
    );
    let dog_impl = method_block("Dog", Some("Speaker"), vec![speak]);

    let prog = program(vec![
        Decl::InterfaceDecl(speaker),
        Decl::StructDecl(dog),
        Decl::MethodBlock(dog_impl),
    ]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("struct uya_interface_Speaker {"));
    assert!(c.contains("void *vtable;"));
    assert!(c.contains("void *data;"));

    assert!(c.contains("struct uya_vtable_Speaker {"));
    assert!(c.contains("int32_t (*speak)(void *self);"));

    assert!(c.contains(
        "static const struct uya_vtable_Speaker uya_vtable_Speaker_Dog = {"
    ));
    assert!(c.contains("(int32_t (*)(void *self))&uya_Dog_speak"));

    assert!(c.contains("int32_t uya_Dog_speak(struct Dog self)"));
}
