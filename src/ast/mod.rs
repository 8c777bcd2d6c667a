//! # Abstract syntax tree
//!
//! The upstream contract: the data shape a fully elaborated,
//! type-checked source-language AST takes when it is handed to the emitter
//! in `crate::codegen`. The lexer, parser and type checker that would
//! normally produce values of these types are out of scope for this crate;
//! `crate::bin::uyac` obtains them by deserializing JSON (see
//! `Program`'s `serde` impls) rather than by driving a front end.
mod decl;
mod expr;
mod span;
mod stmt;
mod types;

pub use decl::*;
pub use expr::*;
pub use span::*;
pub use stmt::*;
pub use types::*;
