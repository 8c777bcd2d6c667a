//! Error-union returns combined with `errdefer`/`defer` go through the
//! goto-based check/error/normal epilogue, and
//! `_normal_return_<fn>` must never replay the `errdefer` body.

mod support;
use support::*;

use uya::ast::Decl;

#[test]
fn errdefer_only_runs_on_the_error_exit_path() {
    let cleanup = block(vec![expr_stmt(call(ident("log_failure"), vec![]))]);

    let body = vec![
        errdefer(cleanup),
        ret(Some(error_value("Oops"))),
    ];

    let f = fn_decl(
        "f",
        vec![],
        error_union(named("i32")),
        body,
    );

    let prog = program(vec![Decl::FnDecl(f)]);

    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(c.contains("goto _check_error_return_f;"));
    assert!(c.contains("_check_error_return_f:"));
    assert!(c.contains("if (_uya_ret.error_id != 0) {"));
    assert!(c.contains("goto _error_return_f;"));
    assert!(c.contains("_error_return_f:"));
    assert!(c.contains("_normal_return_f:"));

    let error_label_pos = c.find("_error_return_f:").unwrap();
    let normal_label_pos = c.find("_normal_return_f:").unwrap();
    assert!(error_label_pos < normal_label_pos);

    let error_block = &c[error_label_pos..normal_label_pos];
    assert!(error_block.contains("log_failure();"));

    let normal_block = &c[normal_label_pos..];
    assert!(!normal_block.contains("log_failure();"));
}

#[test]
fn simple_function_with_no_defer_skips_the_epilogue_entirely() {
    let get_x = fn_decl(
        "get_x",
        vec![param("p", ptr(named("Point")))],
        named("i32"),
        vec![ret(Some(member(ident("p"), "x")))],
    );
    let point = struct_decl(
        "Point",
        vec![],
        vec![field("x", named("i32")), field("y", named("i32"))],
    );

    let prog = program(vec![Decl::StructDecl(point), Decl::FnDecl(get_x)]);
    let c = uya::codegen::generate(&prog, false).expect("generation must succeed");

    assert!(!c.contains("_check_error_return_get_x"));
    assert!(!c.contains("_error_return_get_x"));
    assert!(!c.contains("_normal_return_get_x"));
}
