//! # uya
//!
//! The AST-to-C99 lowering backend for the Uya systems language. This
//! crate takes an already-parsed, already-type-checked [`ast::Program`]
//! and emits a single C99 translation unit implementing it; see
//! [`codegen::generate`].

pub mod ast;
pub mod codegen;
