//! Two distinct error names that hash to the same 32-bit id must fail
//! generation outright rather than silently alias.

mod support;
use support::*;

use std::collections::HashMap;
use uya::ast::Decl;
use uya::codegen::util::hash_error_name;

/// Finds two distinct names the crate's own djb2-derived hash sends to the
/// same bucket. The hash is 32 bits, so by the birthday bound a collision
/// shows up well within this many draws.
fn find_colliding_names() -> (String, String) {
    let mut seen: HashMap<u32, String> = HashMap::new();
    for i in 0..300_000u32 {
        let name = format!("Err{i}");
        let h = hash_error_name(&name);
        if let Some(first) = seen.get(&h) {
            if *first != name {
                return (first.clone(), name);
            }
        }
        seen.insert(h, name);
    }
    panic!("no collision found in the search space; widen it");
}

#[test]
fn colliding_error_names_reject_generation() {
    let (first, second) = find_colliding_names();

    let fn_a = fn_decl(
        "a",
        vec![],
        error_union(named("i32")),
        vec![ret(Some(error_value(&first)))],
    );
    let fn_b = fn_decl(
        "b",
        vec![],
        error_union(named("i32")),
        vec![ret(Some(error_value(&second)))],
    );

    let prog = program(vec![Decl::FnDecl(fn_a), Decl::FnDecl(fn_b)]);

    let result = uya::codegen::generate(&prog, false);
    assert!(result.is_err(), "two error names with the same hash must not both generate cleanly");
}
