//! Array-returning functions wrap the result in a `uya_array_<T>_<N>`
//! struct since C99 cannot return a native array by value.

mod support;
use support::*;

use uya::ast::Decl;

#[test]
fn array_return_emits_wrapper_struct_and_wraps_the_literal() {
    let make = fn_decl(
        "make",
        vec![],
        array_ty(named("i32"), 3),
        vec![ret(Some(array_literal(vec![int_lit(1), int_lit(2), int_lit(3)])))],
    );

    let prog = program(vec![Decl::FnDecl(make)]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("struct uya_array_int32_t_3 {"));
    assert!(c.contains("int32_t data[3];"));
    assert!(c.contains("struct uya_array_int32_t_3 make(void)"));
    assert!(c.contains("struct uya_array_int32_t_3 _uya_ret;"));
    assert!(c.contains("_uya_ret = (struct uya_array_int32_t_3){ .data = { 1, 2, 3 } };"));
    assert!(c.contains("return _uya_ret;"));
}
